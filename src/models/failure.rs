//! Failure ticket model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{EquipmentKind, FailurePriority, FailureStatus, MaintenanceKind};

/// Recorded equipment failure awaiting technician resolution
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Failure {
    pub id: i32,
    /// F-<year>-<id>, assigned on creation
    pub code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Free category, e.g. "connectivity", "image", "power"
    pub category: Option<String>,
    pub priority: FailurePriority,
    pub status: FailureStatus,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub reported_by: Option<i32>,
    pub assigned_technician_id: Option<i32>,
    pub reported_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub repair_started_at: Option<DateTime<Utc>>,
    pub repair_finished_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
    pub requires_maintenance: bool,
    /// Identifier from the spreadsheet the ticket was migrated from
    pub external_ref: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
    pub updated_at: DateTime<Utc>,
}

impl Failure {
    /// Hours between report and repair completion
    pub fn resolution_hours(&self) -> Option<f64> {
        self.repair_finished_at
            .map(|done| (done - self.reported_at).num_minutes() as f64 / 60.0)
    }
}

/// Failure with resolved names for list views
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FailureDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub failure: Failure,
    pub equipment_code: Option<String>,
    pub equipment_name: Option<String>,
    pub technician_name: Option<String>,
    pub reporter_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFailure {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub priority: Option<FailurePriority>,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub assigned_technician_id: Option<i32>,
    pub requires_maintenance: Option<bool>,
    /// Defaults to now; used when back-filling from spreadsheets
    pub reported_at: Option<DateTime<Utc>>,
    /// Spreadsheet reference of a migrated ticket
    #[validate(length(max = 100))]
    pub external_ref: Option<String>,
}

/// Editable free fields; lifecycle moves go through dedicated endpoints
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFailure {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub priority: Option<FailurePriority>,
    pub requires_maintenance: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct FailureQuery {
    pub status: Option<FailureStatus>,
    pub priority: Option<FailurePriority>,
    pub equipment_kind: Option<EquipmentKind>,
    pub equipment_id: Option<i32>,
    pub technician_id: Option<i32>,
    /// Only open, assigned or in-progress tickets
    pub pending: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignFailure {
    pub technician_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FinishRepair {
    #[validate(length(min = 1, max = 4000, message = "Resolution is required"))]
    pub resolution: String,
}

/// Close a resolved ticket, optionally recording the corrective work
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CloseFailure {
    /// Create a completed maintenance record for the repair
    #[serde(default)]
    pub record_maintenance: bool,
    pub maintenance_kind: Option<MaintenanceKind>,
    #[validate(range(min = 0))]
    pub downtime_minutes: Option<i32>,
    pub cost: Option<rust_decimal::Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CancelFailure {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FailureComment {
    pub id: i32,
    pub failure_id: i32,
    pub user_id: Option<i32>,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 4000, message = "Comment must not be empty"))]
    pub body: String,
}
