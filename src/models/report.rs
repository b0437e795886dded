//! Dashboard and report payloads

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::{
    enums::EquipmentKind,
    equipment::{EquipmentSummary, StatusCounts},
    failure::FailureDetails,
    maintenance::Maintenance,
};

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardTotals {
    pub users: i64,
    pub cameras: i64,
    pub active_cameras: i64,
    pub failures: i64,
    pub open_failures: i64,
    pub in_progress_failures: i64,
    pub maintenance: i64,
    pub locations: i64,
    pub switches: i64,
    pub nvrs: i64,
    pub ups_units: i64,
    pub power_supplies: i64,
    pub cabinets: i64,
}

/// Percentages rounded to one decimal
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardPercentages {
    pub active_cameras: f64,
    pub inactive_cameras: f64,
    pub open_failures: f64,
    pub resolved_failures: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub totals: DashboardTotals,
    pub percentages: DashboardPercentages,
    /// 0 (everything down) to 100 (healthy)
    pub health_score: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_kind: Option<EquipmentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentActivity {
    pub recent_failures: Vec<FailureDetails>,
    pub upcoming_maintenance: Vec<Maintenance>,
    pub cameras_with_failures: Vec<EquipmentSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Excellent,
    Good,
    Regular,
    Critical,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExecutiveSummary {
    pub total_cameras: i64,
    pub operational_cameras: i64,
    pub uptime_percent: f64,
    pub open_failures: i64,
    pub critical_failures: i64,
    pub failures_last_30_days: i64,
    pub maintenance_completed_last_30_days: i64,
    pub overall_status: OverallStatus,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TopEquipment {
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub code: Option<String>,
    pub name: Option<String>,
    pub failures: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailureReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: i64,
    #[schema(value_type = Object)]
    pub by_status: IndexMap<String, i64>,
    #[schema(value_type = Object)]
    pub by_priority: IndexMap<String, i64>,
    #[schema(value_type = Object)]
    pub by_equipment_kind: IndexMap<String, i64>,
    pub per_day: Vec<DailyCount>,
    pub mean_resolution_hours: Option<f64>,
    pub top_equipment: Vec<TopEquipment>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentStatusReport {
    #[schema(value_type = Object)]
    pub kinds: IndexMap<String, StatusCounts>,
    pub totals: StatusCounts,
}
