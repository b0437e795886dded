//! Photo attachments repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::PhotoOwner,
        photo::{NewPhoto, Photo},
    },
};

#[derive(Clone)]
pub struct PhotosRepository {
    pool: Pool<Postgres>,
}

impl PhotosRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, photo: &NewPhoto) -> AppResult<Photo> {
        let row = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (
                owner_kind, owner_id, file_name, original_name, content_type,
                size_bytes, caption, uploaded_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(photo.owner_kind)
        .bind(photo.owner_id)
        .bind(&photo.file_name)
        .bind(&photo.original_name)
        .bind(&photo.content_type)
        .bind(photo.size_bytes)
        .bind(&photo.caption)
        .bind(photo.uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, owner_kind: PhotoOwner, owner_id: i32) -> AppResult<Vec<Photo>> {
        let rows = sqlx::query_as::<_, Photo>(
            "SELECT * FROM photos WHERE owner_kind = $1 AND owner_id = $2 ORDER BY uploaded_at, id",
        )
        .bind(owner_kind)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete the row, returning it so the caller can remove the file
    pub async fn delete(&self, id: i32) -> AppResult<Photo> {
        sqlx::query_as::<_, Photo>("DELETE FROM photos WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Photo {} not found", id)))
    }
}
