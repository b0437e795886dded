//! Technician endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        technician::{
            CreateTechnician, Technician, TechnicianQuery, TechnicianWorkload, UpdateTechnician,
        },
        user::Resource,
    },
};

use super::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/technicians",
    tag = "technicians",
    security(("bearer_auth" = [])),
    params(TechnicianQuery),
    responses(
        (status = 200, description = "List of technicians", body = Vec<Technician>)
    )
)]
pub async fn list_technicians(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TechnicianQuery>,
) -> AppResult<Json<Vec<Technician>>> {
    claims.require_read(Resource::Users)?;

    let technicians = state.services.technicians.list(&query).await?;
    Ok(Json(technicians))
}

#[utoipa::path(
    get,
    path = "/technicians/{id}",
    tag = "technicians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Technician ID")),
    responses(
        (status = 200, description = "Technician details", body = Technician),
        (status = 404, description = "Technician not found")
    )
)]
pub async fn get_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Technician>> {
    claims.require_read(Resource::Users)?;

    let technician = state.services.technicians.get_by_id(id).await?;
    Ok(Json(technician))
}

#[utoipa::path(
    post,
    path = "/technicians",
    tag = "technicians",
    security(("bearer_auth" = [])),
    request_body = CreateTechnician,
    responses(
        (status = 201, description = "Technician created", body = Technician),
        (status = 409, description = "Employee code already exists")
    )
)]
pub async fn create_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTechnician>,
) -> AppResult<(StatusCode, Json<Technician>)> {
    claims.require_admin()?;
    data.validate()?;

    let technician = state.services.technicians.create(data).await?;
    Ok((StatusCode::CREATED, Json(technician)))
}

#[utoipa::path(
    put,
    path = "/technicians/{id}",
    tag = "technicians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Technician ID")),
    request_body = UpdateTechnician,
    responses(
        (status = 200, description = "Technician updated", body = Technician),
        (status = 404, description = "Technician not found"),
        (status = 409, description = "Employee code already exists")
    )
)]
pub async fn update_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateTechnician>,
) -> AppResult<Json<Technician>> {
    claims.require_admin()?;
    data.validate()?;

    let technician = state.services.technicians.update(id, data).await?;
    Ok(Json(technician))
}

/// Deactivate a technician; assigned history is kept
#[utoipa::path(
    delete,
    path = "/technicians/{id}",
    tag = "technicians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Technician ID")),
    responses(
        (status = 200, description = "Technician deactivated", body = Technician),
        (status = 404, description = "Technician not found")
    )
)]
pub async fn delete_technician(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Technician>> {
    claims.require_delete(Resource::Users)?;

    let technician = state.services.technicians.delete(id).await?;
    Ok(Json(technician))
}

/// Open failures and pending maintenance assigned to a technician
#[utoipa::path(
    get,
    path = "/technicians/{id}/workload",
    tag = "technicians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Technician ID")),
    responses(
        (status = 200, description = "Workload", body = TechnicianWorkload),
        (status = 404, description = "Technician not found")
    )
)]
pub async fn workload(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TechnicianWorkload>> {
    claims.require_read(Resource::Users)?;

    let workload = state.services.technicians.workload(id).await?;
    Ok(Json(workload))
}
