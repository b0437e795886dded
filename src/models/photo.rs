//! Photo attachments for failures and maintenance records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::PhotoOwner;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Photo {
    pub id: i32,
    pub owner_kind: PhotoOwner,
    pub owner_id: i32,
    /// Stored file name relative to the upload folder
    pub file_name: String,
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub caption: Option<String>,
    pub uploaded_by: Option<i32>,
    pub uploaded_at: DateTime<Utc>,
}

impl Photo {
    /// Public URL served from the upload folder
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.file_name)
    }
}

/// Photo with its public URL
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhotoResponse {
    #[serde(flatten)]
    pub photo: Photo,
    pub url: String,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        let url = photo.url();
        Self { photo, url }
    }
}

/// Metadata for a new photo, the bytes are written before the row is inserted
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub owner_kind: PhotoOwner,
    pub owner_id: i32,
    pub file_name: String,
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub caption: Option<String>,
    pub uploaded_by: Option<i32>,
}
