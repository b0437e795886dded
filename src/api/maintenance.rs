//! Maintenance endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        enums::PhotoOwner,
        maintenance::{
            CompleteMaintenance, CreateMaintenance, Maintenance, MaintenanceQuery, UpcomingQuery,
            UpdateMaintenance,
        },
        photo::PhotoResponse,
        user::Resource,
    },
};

use super::{
    photos::{read_upload, PhotoForm},
    AuthenticatedUser, PaginatedResponse,
};

#[utoipa::path(
    get,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(MaintenanceQuery),
    responses(
        (status = 200, description = "Maintenance records", body = PaginatedResponse<Maintenance>)
    )
)]
pub async fn list_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MaintenanceQuery>,
) -> AppResult<Json<PaginatedResponse<Maintenance>>> {
    claims.require_read(Resource::Maintenance)?;

    let (records, total) = state.services.maintenance.list(&query).await?;
    Ok(Json(PaginatedResponse::new(records, total, query.page, query.per_page)))
}

#[utoipa::path(
    get,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    responses(
        (status = 200, description = "Maintenance record", body = Maintenance),
        (status = 404, description = "Maintenance not found")
    )
)]
pub async fn get_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Maintenance>> {
    claims.require_read(Resource::Maintenance)?;

    let record = state.services.maintenance.get_by_id(id).await?;
    Ok(Json(record))
}

/// Schedule maintenance
#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Maintenance scheduled", body = Maintenance),
        (status = 404, description = "Equipment, failure or technician not found")
    )
)]
pub async fn create_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<Maintenance>)> {
    claims.require_write(Resource::Maintenance)?;
    data.validate()?;

    let record = state.services.maintenance.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    request_body = UpdateMaintenance,
    responses(
        (status = 200, description = "Maintenance updated", body = Maintenance),
        (status = 404, description = "Maintenance not found"),
        (status = 422, description = "Record already finished")
    )
)]
pub async fn update_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateMaintenance>,
) -> AppResult<Json<Maintenance>> {
    claims.require_write(Resource::Maintenance)?;
    data.validate()?;

    let record = state.services.maintenance.update(id, data).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    responses(
        (status = 204, description = "Maintenance deleted"),
        (status = 404, description = "Maintenance not found")
    )
)]
pub async fn delete_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_delete(Resource::Maintenance)?;

    state.services.maintenance.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/maintenance/{id}/start",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    responses(
        (status = 200, description = "Maintenance started", body = Maintenance),
        (status = 422, description = "Not scheduled")
    )
)]
pub async fn start(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Maintenance>> {
    claims.require_write(Resource::Maintenance)?;

    let record = state.services.maintenance.start(id).await?;
    Ok(Json(record))
}

/// Complete; a camera gets its maintenance dates updated
#[utoipa::path(
    post,
    path = "/maintenance/{id}/complete",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    request_body = CompleteMaintenance,
    responses(
        (status = 200, description = "Maintenance completed", body = Maintenance),
        (status = 422, description = "Already finished")
    )
)]
pub async fn complete(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CompleteMaintenance>,
) -> AppResult<Json<Maintenance>> {
    claims.require_write(Resource::Maintenance)?;
    data.validate()?;

    let record = state.services.maintenance.complete(id, &data).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/maintenance/{id}/cancel",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    responses(
        (status = 200, description = "Maintenance cancelled", body = Maintenance),
        (status = 422, description = "Already finished")
    )
)]
pub async fn cancel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Maintenance>> {
    claims.require_write(Resource::Maintenance)?;

    let record = state.services.maintenance.cancel(id).await?;
    Ok(Json(record))
}

/// Scheduled within the next `days` (default 7)
#[utoipa::path(
    get,
    path = "/maintenance/upcoming",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming maintenance", body = Vec<Maintenance>)
    )
)]
pub async fn upcoming(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<Maintenance>>> {
    claims.require_read(Resource::Maintenance)?;

    let records = state.services.maintenance.upcoming(query.days).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/maintenance/overdue",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue maintenance", body = Vec<Maintenance>)
    )
)]
pub async fn overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Maintenance>>> {
    claims.require_read(Resource::Maintenance)?;

    let records = state.services.maintenance.overdue().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/maintenance/{id}/photos",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    responses(
        (status = 200, description = "Photos", body = Vec<PhotoResponse>),
        (status = 404, description = "Maintenance not found")
    )
)]
pub async fn list_photos(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<PhotoResponse>>> {
    claims.require_read(Resource::Maintenance)?;

    let photos = state.services.photos.list(PhotoOwner::Maintenance, id).await?;
    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/maintenance/{id}/photos",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance ID")),
    request_body(content = PhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = PhotoResponse),
        (status = 400, description = "Unsupported or empty file"),
        (status = 404, description = "Maintenance not found")
    )
)]
pub async fn upload_photo(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PhotoResponse>)> {
    claims.require_write(Resource::Maintenance)?;

    let upload = read_upload(multipart).await?;
    let photo = state
        .services
        .photos
        .upload(PhotoOwner::Maintenance, id, upload, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(photo.into())))
}
