//! Columns and request types shared by every equipment kind

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{EquipmentKind, EquipmentStatus};

/// Columns present on every equipment table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentCore {
    pub id: i32,
    /// Unique identifying code (e.g. CAM-001)
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub status: EquipmentStatus,
    pub location_id: Option<i32>,
    pub installed_on: Option<NaiveDate>,
    pub decommissioned_on: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Common fields of a create request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentFields {
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub ip_address: Option<String>,
    #[validate(length(max = 17, message = "MAC address is too long"))]
    pub mac_address: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub location_id: Option<i32>,
    pub installed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Common fields of an update request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentPatch {
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub location_id: Option<i32>,
    pub installed_on: Option<NaiveDate>,
    pub decommissioned_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// List filters shared by every equipment kind
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub status: Option<EquipmentStatus>,
    pub location_id: Option<i32>,
    /// Free text over code, name and IP address
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Status change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusChange {
    pub status: EquipmentStatus,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Row of the equipment status history
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub old_status: Option<EquipmentStatus>,
    pub new_status: EquipmentStatus,
    pub reason: Option<String>,
    pub changed_by: Option<i32>,
    pub changed_at: DateTime<Utc>,
}

/// Kind-agnostic view used by cross-kind searches
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EquipmentSummary {
    pub kind: EquipmentKind,
    pub id: i32,
    pub code: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub status: EquipmentStatus,
    pub location_id: Option<i32>,
}

/// Equipment search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentSearch {
    pub q: String,
    pub limit: Option<i64>,
}

/// Per-status counts for one equipment kind
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StatusCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub failing: i64,
    pub maintenance: i64,
    pub decommissioned: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: EquipmentStatus, count: i64) {
        self.total += count;
        match status {
            EquipmentStatus::Active => self.active += count,
            EquipmentStatus::Inactive => self.inactive += count,
            EquipmentStatus::Failing => self.failing += count,
            EquipmentStatus::Maintenance => self.maintenance += count,
            EquipmentStatus::Decommissioned => self.decommissioned += count,
        }
    }
}

/// Access to the shared columns of any equipment row
pub trait HasCore {
    const KIND: EquipmentKind;

    fn core(&self) -> &EquipmentCore;
}
