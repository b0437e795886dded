//! Explicit network links between equipment

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        network_link::{CreateNetworkLink, NetworkLink, NetworkLinkQuery},
        user::Resource,
    },
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkActivation {
    pub active: bool,
}

/// Links touching a device, or every link
#[utoipa::path(
    get,
    path = "/network-links",
    tag = "network-links",
    security(("bearer_auth" = [])),
    params(NetworkLinkQuery),
    responses(
        (status = 200, description = "Network links", body = Vec<NetworkLink>)
    )
)]
pub async fn list_links(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<NetworkLinkQuery>,
) -> AppResult<Json<Vec<NetworkLink>>> {
    claims.require_read(Resource::Equipment)?;

    let links = state.services.inventory.links(&query).await?;
    Ok(Json(links))
}

#[utoipa::path(
    post,
    path = "/network-links",
    tag = "network-links",
    security(("bearer_auth" = [])),
    request_body = CreateNetworkLink,
    responses(
        (status = 201, description = "Link created", body = NetworkLink),
        (status = 400, description = "Self link"),
        (status = 404, description = "Unknown device"),
        (status = 409, description = "Link already exists")
    )
)]
pub async fn create_link(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateNetworkLink>,
) -> AppResult<(StatusCode, Json<NetworkLink>)> {
    claims.require_write(Resource::Equipment)?;
    data.validate()?;

    let link = state.services.inventory.create_link(&data).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// Enable or disable a link without deleting it
#[utoipa::path(
    put,
    path = "/network-links/{id}",
    tag = "network-links",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Link ID")),
    request_body = LinkActivation,
    responses(
        (status = 200, description = "Link updated", body = NetworkLink),
        (status = 404, description = "Link not found")
    )
)]
pub async fn set_link_active(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<LinkActivation>,
) -> AppResult<Json<NetworkLink>> {
    claims.require_write(Resource::Equipment)?;

    let link = state.services.inventory.set_link_active(id, data.active).await?;
    Ok(Json(link))
}

#[utoipa::path(
    delete,
    path = "/network-links/{id}",
    tag = "network-links",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Link ID")),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 404, description = "Link not found")
    )
)]
pub async fn delete_link(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_delete(Resource::Equipment)?;

    state.services.inventory.delete_link(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
