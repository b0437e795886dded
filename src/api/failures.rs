//! Failure ticket endpoints and lifecycle transitions

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
        failure::{
            AssignFailure, CancelFailure, CloseFailure, CreateComment, CreateFailure, Failure,
            FailureComment, FailureDetails, FailureQuery, FinishRepair, UpdateFailure,
        },
        impact::ImpactAnalysis,
        photo::PhotoResponse,
        user::Resource,
    },
    services::failures::ClosedFailure,
};

use super::{
    photos::{read_upload, PhotoForm},
    AuthenticatedUser, PaginatedResponse,
};

/// List failures
#[utoipa::path(
    get,
    path = "/failures",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(FailureQuery),
    responses(
        (status = 200, description = "List of failures", body = PaginatedResponse<FailureDetails>)
    )
)]
pub async fn list_failures(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<FailureQuery>,
) -> AppResult<Json<PaginatedResponse<FailureDetails>>> {
    claims.require_read(Resource::Failures)?;

    let (failures, total) = state.services.failures.list(&query).await?;
    Ok(Json(PaginatedResponse::new(failures, total, query.page, query.per_page)))
}

/// Get failure details
#[utoipa::path(
    get,
    path = "/failures/{id}",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 200, description = "Failure details", body = FailureDetails),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn get_failure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FailureDetails>> {
    claims.require_read(Resource::Failures)?;

    let failure = state.services.failures.get_details(id).await?;
    Ok(Json(failure))
}

/// Report a failure
#[utoipa::path(
    post,
    path = "/failures",
    tag = "failures",
    security(("bearer_auth" = [])),
    request_body = CreateFailure,
    responses(
        (status = 201, description = "Failure reported", body = Failure),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Equipment or technician not found")
    )
)]
pub async fn create_failure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateFailure>,
) -> AppResult<(StatusCode, Json<Failure>)> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let failure = state.services.failures.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(failure)))
}

/// Update free fields of an open ticket
#[utoipa::path(
    put,
    path = "/failures/{id}",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = UpdateFailure,
    responses(
        (status = 200, description = "Failure updated", body = Failure),
        (status = 404, description = "Failure not found"),
        (status = 422, description = "Ticket already closed")
    )
)]
pub async fn update_failure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateFailure>,
) -> AppResult<Json<Failure>> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let failure = state.services.failures.update(id, data).await?;
    Ok(Json(failure))
}

#[utoipa::path(
    delete,
    path = "/failures/{id}",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 204, description = "Failure deleted"),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn delete_failure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_delete(Resource::Failures)?;

    state.services.failures.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a technician
#[utoipa::path(
    post,
    path = "/failures/{id}/assign",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = AssignFailure,
    responses(
        (status = 200, description = "Technician assigned", body = Failure),
        (status = 404, description = "Failure or technician not found"),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn assign(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AssignFailure>,
) -> AppResult<Json<Failure>> {
    claims.require_write(Resource::Failures)?;

    let failure = state.services.failures.assign(id, data.technician_id).await?;
    Ok(Json(failure))
}

/// Start (or resume) the repair
#[utoipa::path(
    post,
    path = "/failures/{id}/start",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 200, description = "Repair started", body = Failure),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn start_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Failure>> {
    claims.require_write(Resource::Failures)?;

    let failure = state.services.failures.start_repair(id).await?;
    Ok(Json(failure))
}

/// Mark the repair as done
#[utoipa::path(
    post,
    path = "/failures/{id}/resolve",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = FinishRepair,
    responses(
        (status = 200, description = "Repair finished", body = Failure),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn finish_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<FinishRepair>,
) -> AppResult<Json<Failure>> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let failure = state.services.failures.finish_repair(id, &data).await?;
    Ok(Json(failure))
}

/// Close a resolved ticket, optionally recording the corrective maintenance
#[utoipa::path(
    post,
    path = "/failures/{id}/close",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = CloseFailure,
    responses(
        (status = 200, description = "Failure closed", body = ClosedFailure),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn close(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CloseFailure>,
) -> AppResult<Json<ClosedFailure>> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let closed = state.services.failures.close(&claims, id, &data).await?;
    Ok(Json(closed))
}

#[utoipa::path(
    post,
    path = "/failures/{id}/cancel",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = CancelFailure,
    responses(
        (status = 200, description = "Failure cancelled", body = Failure),
        (status = 422, description = "Ticket already closed")
    )
)]
pub async fn cancel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CancelFailure>,
) -> AppResult<Json<Failure>> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let failure = state.services.failures.cancel(id, &data).await?;
    Ok(Json(failure))
}

#[utoipa::path(
    get,
    path = "/failures/{id}/comments",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<FailureComment>),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn list_comments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<FailureComment>>> {
    claims.require_read(Resource::Failures)?;

    let comments = state.services.failures.comments(id).await?;
    Ok(Json(comments))
}

#[utoipa::path(
    post,
    path = "/failures/{id}/comments",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = FailureComment),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<FailureComment>)> {
    claims.require_write(Resource::Failures)?;
    data.validate()?;

    let comment = state
        .services
        .failures
        .add_comment(&claims, id, data.body.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Devices affected by the failed equipment
#[utoipa::path(
    get,
    path = "/failures/{id}/impact",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 200, description = "Impact analysis", body = ImpactAnalysis),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn impact(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ImpactAnalysis>> {
    claims.require_read(Resource::Failures)?;

    let analysis = state.services.failures.impact(id).await?;
    Ok(Json(analysis))
}

#[utoipa::path(
    get,
    path = "/failures/{id}/photos",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    responses(
        (status = 200, description = "Photos", body = Vec<PhotoResponse>),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn list_photos(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<PhotoResponse>>> {
    claims.require_read(Resource::Failures)?;

    let photos = state.services.photos.list(PhotoOwner::Failure, id).await?;
    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/failures/{id}/photos",
    tag = "failures",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Failure ID")),
    request_body(content = PhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = PhotoResponse),
        (status = 400, description = "Unsupported or empty file"),
        (status = 404, description = "Failure not found")
    )
)]
pub async fn upload_photo(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PhotoResponse>)> {
    claims.require_write(Resource::Failures)?;

    let upload = read_upload(multipart).await?;
    let photo = state
        .services
        .photos
        .upload(PhotoOwner::Failure, id, upload, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(photo.into())))
}
