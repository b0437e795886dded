//! Network switch model

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
pub struct Switch {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_id: Option<i32>,
    pub total_ports: Option<i32>,
    pub poe_ports: Option<i32>,
    pub poe_budget_watts: Option<Decimal>,
    pub managed: bool,
    pub power_supply_id: Option<i32>,
    pub ups_id: Option<i32>,
}

impl HasCore for Switch {
    const KIND: EquipmentKind = EquipmentKind::Switch;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateSwitch {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1, max = 512))]
    pub total_ports: Option<i32>,
    #[validate(range(min = 0, max = 512))]
    pub poe_ports: Option<i32>,
    pub poe_budget_watts: Option<Decimal>,
    pub managed: Option<bool>,
    pub power_supply_id: Option<i32>,
    pub ups_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSwitch {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1, max = 512))]
    pub total_ports: Option<i32>,
    #[validate(range(min = 0, max = 512))]
    pub poe_ports: Option<i32>,
    pub poe_budget_watts: Option<Decimal>,
    pub managed: Option<bool>,
    pub power_supply_id: Option<i32>,
    pub ups_id: Option<i32>,
}

/// Port and PoE usage of a switch, computed from the cameras plugged into it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SwitchUsage {
    pub switch_id: i32,
    pub total_ports: Option<i32>,
    pub used_ports: i64,
    pub free_ports: Option<i64>,
    pub poe_ports: Option<i32>,
    pub poe_devices: i64,
    /// Ports claimed by more than one camera
    pub conflicting_ports: Vec<i32>,
}
