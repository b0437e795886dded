//! NVR/DVR recorder model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::{EquipmentKind, RecorderType},
    equipment::{EquipmentCore, EquipmentFields, EquipmentPatch, HasCore},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Nvr {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_id: Option<i32>,
    pub system_type: RecorderType,
    pub channels: Option<i32>,
    pub storage_capacity_gb: Option<Decimal>,
    pub switch_id: Option<i32>,
    pub ups_id: Option<i32>,
}

impl HasCore for Nvr {
    const KIND: EquipmentKind = EquipmentKind::Nvr;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateNvr {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_id: Option<i32>,
    pub system_type: Option<RecorderType>,
    #[validate(range(min = 1, max = 256))]
    pub channels: Option<i32>,
    pub storage_capacity_gb: Option<Decimal>,
    pub switch_id: Option<i32>,
    pub ups_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNvr {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_id: Option<i32>,
    pub system_type: Option<RecorderType>,
    #[validate(range(min = 1, max = 256))]
    pub channels: Option<i32>,
    pub storage_capacity_gb: Option<Decimal>,
    pub switch_id: Option<i32>,
    pub ups_id: Option<i32>,
}
