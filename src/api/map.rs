//! Map UI endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        map::{
            BuildingsResponse, MapCameraQuery, MapCamerasResponse, MapLocationsResponse,
            MapStatsResponse,
        },
        user::Resource,
    },
};

use super::AuthenticatedUser;

/// Camera markers; coordinates fall back to the camera's location
#[utoipa::path(
    get,
    path = "/map/cameras",
    tag = "map",
    security(("bearer_auth" = [])),
    params(MapCameraQuery),
    responses(
        (status = 200, description = "Camera markers", body = MapCamerasResponse)
    )
)]
pub async fn cameras(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MapCameraQuery>,
) -> AppResult<Json<MapCamerasResponse>> {
    claims.require_read(Resource::Equipment)?;

    let response = state.services.map.cameras(query).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/map/buildings",
    tag = "map",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Building names for the filter", body = BuildingsResponse)
    )
)]
pub async fn buildings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BuildingsResponse>> {
    claims.require_read(Resource::Equipment)?;

    let response = state.services.map.buildings().await?;
    Ok(Json(response))
}

/// Georeferenced locations with their camera counts
#[utoipa::path(
    get,
    path = "/map/locations",
    tag = "map",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Locations with coordinates", body = MapLocationsResponse)
    )
)]
pub async fn locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MapLocationsResponse>> {
    claims.require_read(Resource::Equipment)?;

    let response = state.services.map.locations().await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/map/stats",
    tag = "map",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Camera totals per building", body = MapStatsResponse)
    )
)]
pub async fn stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<MapStatsResponse>> {
    claims.require_read(Resource::Equipment)?;

    let response = state.services.map.stats().await?;
    Ok(Json(response))
}
