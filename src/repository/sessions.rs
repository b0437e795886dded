//! Login sessions repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::{error::AppResult, models::{enums::UserRole, user::SessionRow}};

/// Session joined with the owning account
#[derive(Debug, Clone, FromRow)]
pub struct ActiveSession {
    pub session_id: i64,
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionsRepository {
    pool: Pool<Postgres>,
}

impl SessionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        token_hash: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<SessionRow> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO user_sessions (token_hash, user_id, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Find a live session and slide its expiry in one statement
    pub async fn touch(
        &self,
        token_hash: &str,
        new_expiry: DateTime<Utc>,
    ) -> AppResult<Option<ActiveSession>> {
        let row = sqlx::query_as::<_, ActiveSession>(
            r#"
            UPDATE user_sessions s
            SET last_seen_at = NOW(), expires_at = $2
            FROM users u
            WHERE s.token_hash = $1 AND s.expires_at > NOW() AND u.id = s.user_id
            RETURNING s.id AS session_id, s.user_id, u.username, u.role, u.is_active, s.expires_at
            "#,
        )
        .bind(token_hash)
        .bind(new_expiry)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, session_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop every session of a user, optionally keeping one
    pub async fn delete_for_user(&self, user_id: i32, keep: Option<i64>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND id != $2")
            .bind(user_id)
            .bind(keep.unwrap_or(0))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
