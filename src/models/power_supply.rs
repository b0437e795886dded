//! Power supply model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::EquipmentKind,
    equipment::{EquipmentCore, EquipmentFields, EquipmentPatch, HasCore},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PowerSupply {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_id: Option<i32>,
    pub max_output_watts: Option<i32>,
    pub output_voltage: Option<Decimal>,
    pub ups_id: Option<i32>,
}

impl HasCore for PowerSupply {
    const KIND: EquipmentKind = EquipmentKind::PowerSupply;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreatePowerSupply {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1))]
    pub max_output_watts: Option<i32>,
    pub output_voltage: Option<Decimal>,
    pub ups_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePowerSupply {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1))]
    pub max_output_watts: Option<i32>,
    pub output_voltage: Option<Decimal>,
    pub ups_id: Option<i32>,
}
