//! Photo attachments shared by failures and maintenance records

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Multipart;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::Resource,
    services::photos::PhotoUpload,
};

use super::AuthenticatedUser;

/// Multipart form accepted by photo uploads
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PhotoForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub caption: Option<String>,
}

/// Read the `file` part (and optional `caption`) of a photo upload
pub async fn read_upload(mut multipart: Multipart) -> AppResult<PhotoUpload> {
    let mut upload: Option<PhotoUpload> = None;
    let mut caption = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read upload: {}", e)))?;
                upload = Some(PhotoUpload {
                    original_name,
                    content_type,
                    bytes: bytes.to_vec(),
                    caption: None,
                });
            }
            Some("caption") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read caption: {}", e)))?;
                caption = Some(text.trim().to_string()).filter(|c| !c.is_empty());
            }
            _ => {}
        }
    }

    let mut upload =
        upload.ok_or_else(|| AppError::Validation("Missing file field".to_string()))?;
    upload.caption = caption;
    Ok(upload)
}

/// Delete a photo and its file
#[utoipa::path(
    delete,
    path = "/photos/{id}",
    tag = "photos",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Photo ID")),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 404, description = "Photo not found")
    )
)]
pub async fn delete_photo(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_write(Resource::Failures)?;

    state.services.photos.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
