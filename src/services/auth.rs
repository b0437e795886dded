//! Authentication, password hashing and session management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{ChangePassword, CreateUser, SessionUser, User},
    },
    repository::Repository,
};

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Raw token, only ever handed to the client
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 32 random bytes, URL-safe base64
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of the token keyed with the server secret; this is what gets stored
pub fn token_digest(secret: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Concurrent updates tolerated while recording one failed login
const MAX_FAILURE_RETRIES: usize = 3;

/// Counter and lock to store after a wrong password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginFailure {
    pub attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// A lock that has lapsed restarts the count at one and is cleared.
/// Reaching `max_attempts` locks the account until `now + lockout`.
pub fn next_login_failure(
    attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_attempts: i32,
    lockout: Duration,
) -> LoginFailure {
    let lapsed = locked_until.is_some_and(|until| until <= now);
    let (attempts, locked_until) = if lapsed {
        (1, None)
    } else {
        (attempts + 1, locked_until)
    };

    LoginFailure {
        attempts,
        locked_until: if attempts >= max_attempts.max(1) {
            Some(now + lockout)
        } else {
            locked_until
        },
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::minutes(self.config.session_timeout_minutes.max(1))
    }

    /// Count a wrong password against the account, retrying when a concurrent
    /// attempt updated the counter in between
    async fn record_failure(&self, mut user: User, now: DateTime<Utc>) -> AppResult<LoginFailure> {
        let lockout = Duration::minutes(self.config.lockout_minutes);
        for _ in 0..MAX_FAILURE_RETRIES {
            let failure = next_login_failure(
                user.failed_login_attempts,
                user.locked_until,
                now,
                self.config.max_failed_logins,
                lockout,
            );
            let stored = self
                .repository
                .users
                .record_login_failure(
                    user.id,
                    (user.failed_login_attempts, user.locked_until),
                    failure.attempts,
                    failure.locked_until,
                )
                .await?;
            if stored {
                return Ok(failure);
            }
            user = self.repository.users.get_by_id(user.id).await?;
        }
        Err(AppError::Conflict(
            "Too many simultaneous login attempts, retry".to_string(),
        ))
    }

    /// Authenticate by username or e-mail and open a session
    pub async fn login(
        &self,
        login: &str,
        password: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<LoginOutcome> {
        let invalid = || AppError::Authentication("Invalid username or password".to_string());

        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(invalid)?;

        if !user.is_active {
            tracing::warn!(user_id = user.id, "Login attempt on inactive account");
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let now = Utc::now();
        if user.is_locked(now) {
            tracing::warn!(user_id = user.id, "Login attempt on locked account");
            return Err(AppError::Authentication(
                "Account is temporarily locked after too many failed attempts".to_string(),
            ));
        }

        if !verify_password(password, &user.password_hash)? {
            let user_id = user.id;
            let failure = self.record_failure(user, now).await?;
            tracing::warn!(user_id, attempts = failure.attempts, "Failed login");
            if failure.locked_until.is_some_and(|until| until > now) {
                return Err(AppError::Authentication(
                    "Account is temporarily locked after too many failed attempts".to_string(),
                ));
            }
            return Err(invalid());
        }

        self.repository.users.record_login_success(user.id).await?;

        let token = generate_token();
        let expires_at = now + self.session_timeout();
        self.repository
            .sessions
            .create(
                &token_digest(&self.config.secret_key, &token),
                user.id,
                expires_at,
                ip_address,
                user_agent,
            )
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(LoginOutcome {
            token,
            expires_at,
            user,
        })
    }

    /// Resolve a token into the session's identity, sliding its expiry
    pub async fn authenticate(&self, token: &str) -> AppResult<SessionUser> {
        let digest = token_digest(&self.config.secret_key, token);
        let expires_at = Utc::now() + self.session_timeout();
        let session = self
            .repository
            .sessions
            .touch(&digest, expires_at)
            .await?
            .ok_or_else(|| AppError::Authentication("Session expired or invalid".to_string()))?;

        if !session.is_active {
            self.repository.sessions.delete(session.session_id).await?;
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        Ok(SessionUser {
            session_id: session.session_id,
            user_id: session.user_id,
            username: session.username,
            role: session.role,
            expires_at: session.expires_at,
        })
    }

    pub async fn logout(&self, session: &SessionUser) -> AppResult<()> {
        self.repository.sessions.delete(session.session_id).await?;
        tracing::info!(user_id = session.user_id, "User logged out");
        Ok(())
    }

    /// Change own password; other sessions of the account are closed
    pub async fn change_password(&self, session: &SessionUser, data: &ChangePassword) -> AppResult<()> {
        if data.new_password != data.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        let user = self.repository.users.get_by_id(session.user_id).await?;
        if !verify_password(&data.current_password, &user.password_hash)? {
            return Err(AppError::Authentication("Current password is incorrect".to_string()));
        }
        if data.current_password == data.new_password {
            return Err(AppError::Validation(
                "New password must differ from the current one".to_string(),
            ));
        }

        let hash = hash_password(&data.new_password)?;
        self.repository.users.set_password(user.id, &hash).await?;
        self.repository
            .sessions
            .delete_for_user(user.id, Some(session.session_id))
            .await?;
        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> AppResult<u64> {
        let removed = self.repository.sessions.delete_expired().await?;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }

    /// Create the first superadmin when the user table is empty
    pub async fn bootstrap_admin(&self) -> AppResult<Option<User>> {
        let (Some(username), Some(email), Some(password)) = (
            self.config.bootstrap_admin_username.as_ref(),
            self.config.bootstrap_admin_email.as_ref(),
            self.config.bootstrap_admin_password.as_ref(),
        ) else {
            return Ok(None);
        };

        if self.repository.users.count().await? > 0 {
            return Ok(None);
        }

        let data = CreateUser {
            username: username.clone(),
            email: email.clone(),
            password: password.clone(),
            full_name: Some("Administrator".to_string()),
            role: Some(UserRole::Superadmin),
            phone: None,
            department: None,
            is_active: Some(true),
        };
        let user = self
            .repository
            .users
            .create(&data, &hash_password(password)?)
            .await?;
        tracing::info!(username = %user.username, "Bootstrap superadmin created");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_token_digest_is_keyed() {
        let a = token_digest("secret-a", "token");
        let b = token_digest("secret-b", "token");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, token_digest("secret-a", "token"));
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn test_fifth_failure_locks_account() {
        let lockout = Duration::minutes(15);
        let mut state = LoginFailure { attempts: 0, locked_until: None };
        for expected in 1..=4 {
            state = next_login_failure(state.attempts, state.locked_until, at(0), 5, lockout);
            assert_eq!(state.attempts, expected);
            assert_eq!(state.locked_until, None);
        }
        state = next_login_failure(state.attempts, state.locked_until, at(0), 5, lockout);
        assert_eq!(state.attempts, 5);
        assert_eq!(state.locked_until, Some(at(15)));
    }

    #[test]
    fn test_failure_after_lock_lapsed_restarts_count() {
        let state = next_login_failure(5, Some(at(15)), at(16), 5, Duration::minutes(15));
        assert_eq!(state, LoginFailure { attempts: 1, locked_until: None });

        // Four more typos are still allowed before the next lock
        let mut state = state;
        for _ in 0..3 {
            state = next_login_failure(state.attempts, state.locked_until, at(17), 5, Duration::minutes(15));
            assert!(state.locked_until.is_none());
        }
        state = next_login_failure(state.attempts, state.locked_until, at(17), 5, Duration::minutes(15));
        assert_eq!(state.attempts, 5);
        assert_eq!(state.locked_until, Some(at(32)));
    }

    #[test]
    fn test_lock_lapsing_exactly_now_counts_as_lapsed() {
        let state = next_login_failure(5, Some(at(15)), at(15), 5, Duration::minutes(15));
        assert_eq!(state.attempts, 1);
        assert_eq!(state.locked_until, None);
    }
}
