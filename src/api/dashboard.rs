//! Dashboard endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        report::{Alert, DashboardStats, RecentActivity},
        user::Resource,
    },
};

use super::AuthenticatedUser;

/// Totals, percentages and health score
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require_read(Resource::Reports)?;

    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}

/// Critical, warning and info alerts
#[utoipa::path(
    get,
    path = "/dashboard/alerts",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active alerts", body = Vec<Alert>)
    )
)]
pub async fn alerts(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Alert>>> {
    claims.require_read(Resource::Reports)?;

    let alerts = state.services.stats.alerts().await?;
    Ok(Json(alerts))
}

/// Latest failures, upcoming maintenance and cameras with open tickets
#[utoipa::path(
    get,
    path = "/dashboard/recent",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recent activity", body = RecentActivity)
    )
)]
pub async fn recent(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RecentActivity>> {
    claims.require_read(Resource::Reports)?;

    let recent = state.services.stats.recent().await?;
    Ok(Json(recent))
}
