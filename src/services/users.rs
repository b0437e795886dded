//! User account management

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{CreateUser, SessionUser, UpdateProfile, UpdateUser, User, UserQuery},
    },
    repository::Repository,
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Create a new user
    pub async fn create(&self, actor: &SessionUser, user: CreateUser) -> AppResult<User> {
        if user.role == Some(UserRole::Superadmin) && actor.role != UserRole::Superadmin {
            return Err(AppError::Authorization(
                "Only a superadmin can create superadmin accounts".to_string(),
            ));
        }
        if self.repository.users.username_exists(&user.username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &hash).await?;
        tracing::info!(user_id = created.id, by = actor.user_id, "User created");
        Ok(created)
    }

    /// Update an existing user
    pub async fn update(&self, actor: &SessionUser, id: i32, user: UpdateUser) -> AppResult<User> {
        let current = self.repository.users.get_by_id(id).await?;

        let touches_superadmin =
            current.role == UserRole::Superadmin || user.role == Some(UserRole::Superadmin);
        if touches_superadmin && actor.role != UserRole::Superadmin {
            return Err(AppError::Authorization(
                "Only a superadmin can modify superadmin accounts".to_string(),
            ));
        }
        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
        if current.role == UserRole::Superadmin
            && (user.is_active == Some(false)
                || user.role.map(|r| r != UserRole::Superadmin).unwrap_or(false))
        {
            self.ensure_other_superadmin().await?;
        }

        let password_hash = match user.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };
        let reset = password_hash.is_some();

        let updated = self.repository.users.update(id, &user, password_hash).await?;
        if reset || user.is_active == Some(false) {
            self.repository.sessions.delete_for_user(id, None).await?;
        }
        Ok(updated)
    }

    /// Deactivate an account and close its sessions
    pub async fn delete(&self, actor: &SessionUser, id: i32) -> AppResult<()> {
        if actor.user_id == id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }
        let current = self.repository.users.get_by_id(id).await?;
        if current.role == UserRole::Superadmin {
            if actor.role != UserRole::Superadmin {
                return Err(AppError::Authorization(
                    "Only a superadmin can delete superadmin accounts".to_string(),
                ));
            }
            self.ensure_other_superadmin().await?;
        }

        self.repository.users.deactivate(id).await?;
        self.repository.sessions.delete_for_user(id, None).await?;
        tracing::info!(user_id = id, by = actor.user_id, "User deactivated");
        Ok(())
    }

    /// Update own profile
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        if let Some(ref email) = profile.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
        self.repository.users.update_profile(user_id, &profile).await
    }

    async fn ensure_other_superadmin(&self) -> AppResult<()> {
        if self
            .repository
            .users
            .count_active_with_role(UserRole::Superadmin)
            .await?
            <= 1
        {
            return Err(AppError::BusinessRule(
                "At least one active superadmin must remain".to_string(),
            ));
        }
        Ok(())
    }
}
