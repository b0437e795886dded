//! Location endpoints (campus, buildings, floors, rooms)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        location::{CreateLocation, Location, LocationEquipment, LocationQuery, UpdateLocation},
        user::Resource,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(LocationQuery),
    responses(
        (status = 200, description = "List of locations", body = PaginatedResponse<Location>)
    )
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<PaginatedResponse<Location>>> {
    claims.require_read(Resource::Equipment)?;

    let (locations, total) = state.services.locations.list(&query).await?;
    Ok(Json(PaginatedResponse::new(locations, total, query.page, query.per_page)))
}

/// Get location by ID
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Location>> {
    claims.require_read(Resource::Equipment)?;

    let location = state.services.locations.get_by_id(id).await?;
    Ok(Json(location))
}

/// Create location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_write(Resource::Equipment)?;
    data.validate()?;

    let location = state.services.locations.create(data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Update location
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocation,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLocation>,
) -> AppResult<Json<Location>> {
    claims.require_write(Resource::Equipment)?;
    data.validate()?;

    let location = state.services.locations.update(id, data).await?;
    Ok(Json(location))
}

/// Delete location
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Location still referenced")
    )
)]
pub async fn delete_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_delete(Resource::Equipment)?;

    state.services.locations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Direct children of a location
#[utoipa::path(
    get,
    path = "/locations/{id}/children",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Child locations", body = Vec<Location>),
        (status = 404, description = "Location not found")
    )
)]
pub async fn children(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Location>>> {
    claims.require_read(Resource::Equipment)?;

    let children = state.services.locations.children(id).await?;
    Ok(Json(children))
}

/// Equipment counts at a location
#[utoipa::path(
    get,
    path = "/locations/{id}/equipment",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Equipment counts", body = LocationEquipment),
        (status = 404, description = "Location not found")
    )
)]
pub async fn equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LocationEquipment>> {
    claims.require_read(Resource::Equipment)?;

    let counts = state.services.locations.equipment(id).await?;
    Ok(Json(counts))
}
