//! Users repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, QueryBuilder};

use super::{like_pattern, page_bounds};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{CreateUser, UpdateProfile, UpdateUser, User, UserQuery},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username or email (authentication)
    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)
            ORDER BY (LOWER(username) = LOWER($1)) DESC
            LIMIT 1
            "#,
        )
        .bind(login.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
        )
        .bind(email)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id != $2)",
        )
        .bind(username)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let (_, per_page, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY username LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);
        let users = select.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
        qb.push(" WHERE TRUE");
        if let Some(pattern) = like_pattern(query.q.as_deref()) {
            qb.push(" AND (username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR full_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(role) = query.role {
            qb.push(" AND role = ").push_bind(role);
        }
        if let Some(is_active) = query.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }
    }

    /// Create a new user; the password must already be hashed
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, email, password_hash, full_name, role, phone, department,
                is_active, password_changed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING *
            "#,
        )
        .bind(user.username.trim())
        .bind(user.email.trim())
        .bind(password_hash)
        .bind(&user.full_name)
        .bind(user.role.unwrap_or_default())
        .bind(&user.phone)
        .bind(&user.department)
        .bind(user.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Administrative update; a new hash forces a password change at next login
    pub async fn update(
        &self,
        id: i32,
        user: &UpdateUser,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "email", user.email.clone());
        set_if_some!(sep, "full_name", user.full_name.clone());
        set_if_some!(sep, "role", user.role);
        set_if_some!(sep, "phone", user.phone.clone());
        set_if_some!(sep, "department", user.department.clone());
        set_if_some!(sep, "is_active", user.is_active);
        if let Some(hash) = password_hash {
            sep.push("password_hash = ").push_bind_unseparated(hash);
            sep.push("password_changed_at = NOW()");
            sep.push("must_change_password = TRUE");
            sep.push("failed_login_attempts = 0");
            sep.push("locked_until = NULL");
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Update own profile
    pub async fn update_profile(&self, id: i32, profile: &UpdateProfile) -> AppResult<User> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "email", profile.email.clone());
        set_if_some!(sep, "full_name", profile.full_name.clone());
        set_if_some!(sep, "phone", profile.phone.clone());
        set_if_some!(sep, "department", profile.department.clone());
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn set_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, password_changed_at = NOW(), must_change_password = FALSE,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reset the failure counter after a successful login
    pub async fn record_login_success(&self, id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = 0, locked_until = NULL, last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store the attempt counter and lock of a failed login, provided the row
    /// still holds the values they were computed from. Returns false when a
    /// concurrent login changed them first.
    pub async fn record_login_failure(
        &self,
        id: i32,
        seen: (i32, Option<DateTime<Utc>>),
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = $2, locked_until = $3
            WHERE id = $1
              AND failed_login_attempts = $4
              AND locked_until IS NOT DISTINCT FROM $5
            "#,
        )
        .bind(id)
        .bind(attempts)
        .bind(locked_until)
        .bind(seen.0)
        .bind(seen.1)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Deactivate an account; rows stay for audit and foreign keys
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Number of active accounts holding a role
    pub async fn count_active_with_role(&self, role: UserRole) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = $1 AND is_active",
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// E-mail of the login account linked to a technician, if any
    pub async fn email_of(&self, id: i32) -> AppResult<Option<String>> {
        let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(email)
    }
}
