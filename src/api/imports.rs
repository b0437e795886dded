//! Spreadsheet import endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        import_report::{ImportKind, ImportReport},
        user::Resource,
    },
};

use super::AuthenticatedUser;

/// Multipart form accepted by the import endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImportForm {
    /// `.xlsx`, `.xlsm`, `.xls` or `.ods` workbook
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Sheet name, defaults to the first sheet
    pub sheet: Option<String>,
    /// `true` to clean and preview rows without writing
    pub dry_run: Option<bool>,
}

struct ImportUpload {
    file_name: String,
    bytes: Vec<u8>,
    sheet: Option<String>,
    dry_run: bool,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

async fn read_form(mut multipart: Multipart) -> AppResult<ImportUpload> {
    let mut file = None;
    let mut sheet = None;
    let mut dry_run = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read upload: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "sheet" | "dry_run" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {}", name, e)))?;
                if name == "sheet" {
                    sheet = Some(value.trim().to_string()).filter(|s| !s.is_empty());
                } else {
                    dry_run = parse_flag(&value);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("Missing file field".to_string()))?;
    Ok(ImportUpload {
        file_name,
        bytes,
        sheet,
        dry_run,
    })
}

/// Import a spreadsheet of locations, cameras, switches, nvrs, ups or failures
#[utoipa::path(
    post,
    path = "/imports/{kind}",
    tag = "imports",
    security(("bearer_auth" = [])),
    params(("kind" = ImportKind, Path, description = "Sheet kind")),
    request_body(content = ImportForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Unsupported file or missing field"),
        (status = 403, description = "Administrator rights required"),
        (status = 422, description = "Unreadable workbook or missing key column")
    )
)]
pub async fn import_sheet(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(kind): Path<ImportKind>,
    multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    claims.require_write(Resource::System)?;

    let upload = read_form(multipart).await?;
    let path = state
        .services
        .import
        .store_upload(&upload.file_name, &upload.bytes)
        .await?;

    tracing::info!(
        kind = %kind,
        file = %upload.file_name,
        dry_run = upload.dry_run,
        user_id = claims.user_id,
        "Spreadsheet import requested"
    );
    let report = state
        .services
        .import
        .import_file(
            kind,
            path,
            upload.sheet,
            Some(upload.file_name),
            upload.dry_run,
            Some(claims.user_id),
        )
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
