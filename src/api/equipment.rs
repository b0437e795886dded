//! Cross-kind equipment endpoints: search, IP lookup, history, impact

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentSearch, EquipmentSummary, StatusHistoryEntry},
        impact::ImpactAnalysis,
        user::Resource,
        EquipmentKind,
    },
};

use super::AuthenticatedUser;

/// Search every equipment kind by code, name, IP or serial number
#[utoipa::path(
    get,
    path = "/equipment/search",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentSearch),
    responses(
        (status = 200, description = "Matching equipment", body = Vec<EquipmentSummary>),
        (status = 400, description = "Empty search")
    )
)]
pub async fn search(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<EquipmentSearch>,
) -> AppResult<Json<Vec<EquipmentSummary>>> {
    claims.require_read(Resource::Equipment)?;

    let term = query.q.trim();
    if term.is_empty() {
        return Err(AppError::Validation("Search term is required".to_string()));
    }
    let found = state.services.inventory.search(term, query.limit).await?;
    Ok(Json(found))
}

/// Equipment using an exact IP address
#[utoipa::path(
    get,
    path = "/equipment/by-ip/{ip}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("ip" = String, Path, description = "IPv4 address")),
    responses(
        (status = 200, description = "Equipment with this address", body = Vec<EquipmentSummary>),
        (status = 400, description = "Invalid IP address")
    )
)]
pub async fn by_ip(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(ip): Path<String>,
) -> AppResult<Json<Vec<EquipmentSummary>>> {
    claims.require_read(Resource::Equipment)?;

    let found = state.services.inventory.find_by_ip(&ip).await?;
    Ok(Json(found))
}

/// Status history, newest first
#[utoipa::path(
    get,
    path = "/equipment/{kind}/{id}/history",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("kind" = EquipmentKind, Path, description = "Equipment kind"),
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Status history", body = Vec<StatusHistoryEntry>)
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((kind, id)): Path<(EquipmentKind, i32)>,
) -> AppResult<Json<Vec<StatusHistoryEntry>>> {
    claims.require_read(Resource::Equipment)?;

    let entries = state.services.inventory.history(kind, id).await?;
    Ok(Json(entries))
}

/// Devices that lose power, connectivity or recording when this one fails
#[utoipa::path(
    get,
    path = "/impact/{kind}/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("kind" = EquipmentKind, Path, description = "Equipment kind"),
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Impact analysis", body = ImpactAnalysis),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn impact(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((kind, id)): Path<(EquipmentKind, i32)>,
) -> AppResult<Json<ImpactAnalysis>> {
    claims.require_read(Resource::Equipment)?;

    let analysis = state.services.impact.analyze(kind, id).await?;
    Ok(Json(analysis))
}
