//! UPS model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::EquipmentKind,
    equipment::{EquipmentCore, EquipmentFields, EquipmentPatch, HasCore},
};

/// Uninterruptible power supply
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ups {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_id: Option<i32>,
    pub capacity_va: Option<i32>,
    pub capacity_watts: Option<i32>,
    pub battery_count: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub last_battery_test_on: Option<NaiveDate>,
}

impl HasCore for Ups {
    const KIND: EquipmentKind = EquipmentKind::Ups;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUps {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity_va: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity_watts: Option<i32>,
    #[validate(range(min = 0, max = 64))]
    pub battery_count: Option<i32>,
    #[validate(range(min = 0))]
    pub runtime_minutes: Option<i32>,
    pub last_battery_test_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUps {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_id: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity_va: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity_watts: Option<i32>,
    #[validate(range(min = 0, max = 64))]
    pub battery_count: Option<i32>,
    #[validate(range(min = 0))]
    pub runtime_minutes: Option<i32>,
    pub last_battery_test_on: Option<NaiveDate>,
}
