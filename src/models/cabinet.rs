//! Cabinet (gabinete) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::{CabinetType, EquipmentKind},
    equipment::{EquipmentCore, EquipmentFields, EquipmentPatch, EquipmentSummary, HasCore},
};

/// Enclosure housing switches, recorders and power equipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cabinet {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: EquipmentCore,
    pub cabinet_type: Option<CabinetType>,
    pub rack_units: Option<i32>,
    pub material: Option<String>,
    /// Ingress protection rating, e.g. IP66
    pub ip_rating: Option<String>,
}

impl HasCore for Cabinet {
    const KIND: EquipmentKind = EquipmentKind::Cabinet;

    fn core(&self) -> &EquipmentCore {
        &self.core
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCabinet {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentFields,
    pub cabinet_type: Option<CabinetType>,
    #[validate(range(min = 1, max = 60))]
    pub rack_units: Option<i32>,
    pub material: Option<String>,
    #[validate(length(max = 10))]
    pub ip_rating: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCabinet {
    #[serde(flatten)]
    #[validate(nested)]
    pub common: EquipmentPatch,
    pub cabinet_type: Option<CabinetType>,
    #[validate(range(min = 1, max = 60))]
    pub rack_units: Option<i32>,
    pub material: Option<String>,
    #[validate(length(max = 10))]
    pub ip_rating: Option<String>,
}

/// Equipment mounted in a cabinet
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CabinetContents {
    pub cabinet: Cabinet,
    pub equipment: Vec<EquipmentSummary>,
}
