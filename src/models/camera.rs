//! Camera model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::{CameraType, EquipmentKind},
    equipment::{EquipmentCore, EquipmentFields, EquipmentPatch, HasCore},
};

/// Security camera
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Camera {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_id: Option<i32>,
    pub camera_type: Option<CameraType>,
    /// e.g. "4MP", "1080p"
    pub resolution: Option<String>,
    pub switch_id: Option<i32>,
    pub switch_port: Option<i32>,
    pub nvr_id: Option<i32>,
    pub nvr_channel: Option<i32>,
    pub power_supply_id: Option<i32>,
    /// Powered from the switch port
    pub poe: bool,
    pub warranty_until: Option<NaiveDate>,
    pub last_maintenance_on: Option<NaiveDate>,
    pub next_maintenance_on: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl HasCore for Camera {
    const KIND: EquipmentKind = EquipmentKind::Camera;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

/// Create camera request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCamera {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_id: Option<i32>,
    pub camera_type: Option<CameraType>,
    pub resolution: Option<String>,
    pub switch_id: Option<i32>,
    #[validate(range(min = 1, max = 128))]
    pub switch_port: Option<i32>,
    pub nvr_id: Option<i32>,
    #[validate(range(min = 1, max = 256))]
    pub nvr_channel: Option<i32>,
    pub power_supply_id: Option<i32>,
    pub poe: Option<bool>,
    pub warranty_until: Option<NaiveDate>,
    pub next_maintenance_on: Option<NaiveDate>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Update camera request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCamera {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_id: Option<i32>,
    pub camera_type: Option<CameraType>,
    pub resolution: Option<String>,
    pub switch_id: Option<i32>,
    #[validate(range(min = 1, max = 128))]
    pub switch_port: Option<i32>,
    pub nvr_id: Option<i32>,
    #[validate(range(min = 1, max = 256))]
    pub nvr_channel: Option<i32>,
    pub power_supply_id: Option<i32>,
    pub poe: Option<bool>,
    pub warranty_until: Option<NaiveDate>,
    pub last_maintenance_on: Option<NaiveDate>,
    pub next_maintenance_on: Option<NaiveDate>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}
