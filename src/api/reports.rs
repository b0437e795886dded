//! Report endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        report::{EquipmentStatusReport, ExecutiveSummary, FailureReport, ReportPeriod},
        user::Resource,
    },
};

use super::AuthenticatedUser;

/// Executive summary: uptime, overall status and recommendations
#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Executive summary", body = ExecutiveSummary)
    )
)]
pub async fn summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ExecutiveSummary>> {
    claims.require_read(Resource::Reports)?;

    let summary = state.services.stats.executive_summary().await?;
    Ok(Json(summary))
}

/// Failure statistics over a period (default: last 30 days)
#[utoipa::path(
    get,
    path = "/reports/failures",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(ReportPeriod),
    responses(
        (status = 200, description = "Failure report", body = FailureReport),
        (status = 400, description = "Start date after end date")
    )
)]
pub async fn failures(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(period): Query<ReportPeriod>,
) -> AppResult<Json<FailureReport>> {
    claims.require_read(Resource::Reports)?;

    let report = state
        .services
        .stats
        .failure_report(period.start_date, period.end_date)
        .await?;
    Ok(Json(report))
}

/// Counts per equipment kind and status
#[utoipa::path(
    get,
    path = "/reports/equipment-status",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment status report", body = EquipmentStatusReport)
    )
)]
pub async fn equipment_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<EquipmentStatusReport>> {
    claims.require_read(Resource::Reports)?;

    let report = state.services.stats.equipment_status().await?;
    Ok(Json(report))
}
