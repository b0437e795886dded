//! Maintenance record model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{EquipmentKind, MaintenanceKind, MaintenanceStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Maintenance {
    pub id: i32,
    pub code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub failure_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub scheduled_for: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cost: Option<Decimal>,
    pub downtime_minutes: Option<i32>,
    pub notes: Option<String>,
    pub created_by: Option<i32>,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Maintenance {
    /// Scheduled in the past and not yet finished
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(
            self.status,
            MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress
        ) && self.scheduled_for.map(|d| d < today).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenance {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<MaintenanceKind>,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub failure_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub scheduled_for: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaintenance {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<MaintenanceKind>,
    pub technician_id: Option<i32>,
    pub scheduled_for: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub downtime_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteMaintenance {
    pub notes: Option<String>,
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub downtime_minutes: Option<i32>,
    /// Next preventive date to set on a camera
    pub next_maintenance_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MaintenanceQuery {
    pub status: Option<MaintenanceStatus>,
    pub kind: Option<MaintenanceKind>,
    pub equipment_kind: Option<EquipmentKind>,
    pub equipment_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UpcomingQuery {
    /// Window in days, default 7
    pub days: Option<i64>,
}
