//! Image attachments stored under the upload folder

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    config::UploadConfig,
    error::{AppError, AppResult},
    models::{
        enums::PhotoOwner,
        photo::{NewPhoto, Photo},
    },
    repository::Repository,
};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const PHOTO_DIR: &str = "photos";

/// Lowercased extension of an accepted image file name
pub fn image_extension(file_name: &str) -> AppResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| AppError::Validation("File has no extension".to_string()))?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported image type .{}, expected one of {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

/// An uploaded file before it is stored
#[derive(Debug)]
pub struct PhotoUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

#[derive(Clone)]
pub struct PhotosService {
    repository: Repository,
    folder: PathBuf,
}

impl PhotosService {
    pub fn new(repository: Repository, config: &UploadConfig) -> Self {
        Self {
            repository,
            folder: PathBuf::from(&config.folder),
        }
    }

    async fn check_owner(&self, owner: PhotoOwner, owner_id: i32) -> AppResult<()> {
        match owner {
            PhotoOwner::Failure => {
                self.repository.failures.get_by_id(owner_id).await?;
            }
            PhotoOwner::Maintenance => {
                self.repository.maintenance.get_by_id(owner_id).await?;
            }
        }
        Ok(())
    }

    pub async fn list(&self, owner: PhotoOwner, owner_id: i32) -> AppResult<Vec<Photo>> {
        self.check_owner(owner, owner_id).await?;
        self.repository.photos.list(owner, owner_id).await
    }

    pub async fn upload(
        &self,
        owner: PhotoOwner,
        owner_id: i32,
        upload: PhotoUpload,
        uploaded_by: Option<i32>,
    ) -> AppResult<Photo> {
        self.check_owner(owner, owner_id).await?;
        if upload.bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        let ext = image_extension(&upload.original_name)?;

        let dir = self.folder.join(PHOTO_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot create upload folder: {}", e)))?;
        let file_name = format!("{}/{}.{}", PHOTO_DIR, Uuid::new_v4(), ext);
        let path = self.folder.join(&file_name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;

        let record = NewPhoto {
            owner_kind: owner,
            owner_id,
            file_name,
            original_name: Some(upload.original_name),
            content_type: upload.content_type,
            size_bytes: upload.bytes.len() as i64,
            caption: upload.caption,
            uploaded_by,
        };
        match self.repository.photos.create(&record).await {
            Ok(photo) => {
                tracing::info!(photo_id = photo.id, owner = %owner, owner_id, "Photo stored");
                Ok(photo)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let photo = self.repository.photos.delete(id).await?;
        let path = self.folder.join(&photo.file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Photo file not removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("gate.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("a.b.webp").unwrap(), "webp");
        assert!(image_extension("report.pdf").is_err());
        assert!(image_extension("noext").is_err());
    }
}
