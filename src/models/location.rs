//! Location model (campus, building, floor, room)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::LocationKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: i32,
    pub code: Option<String>,
    pub name: String,
    pub kind: LocationKind,
    pub parent_id: Option<i32>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateLocation {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub kind: Option<LocationKind>,
    pub parent_id: Option<i32>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub parent_id: Option<i32>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LocationQuery {
    pub kind: Option<LocationKind>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Equipment counts at a location
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LocationEquipment {
    pub location_id: i32,
    pub cameras: i64,
    pub switches: i64,
    pub nvrs: i64,
    pub ups_units: i64,
    pub power_supplies: i64,
    pub cabinets: i64,
}
