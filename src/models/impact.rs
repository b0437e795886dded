//! Failure impact analysis payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::{EquipmentKind, EquipmentStatus};

/// Typed reference to any equipment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct EquipmentRef {
    pub kind: EquipmentKind,
    pub id: i32,
}

impl EquipmentRef {
    pub fn new(kind: EquipmentKind, id: i32) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for EquipmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Why a device is affected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImpactReason {
    /// The device that failed
    InitialFailure,
    PowerLoss,
    ConnectivityLoss,
    RecordingLoss,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImpactedDevice {
    pub equipment: EquipmentRef,
    pub code: Option<String>,
    pub name: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub reason: ImpactReason,
    /// Hops from the failed device
    pub depth: u32,
    /// Device through which the impact arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<EquipmentRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImpactAnalysis {
    pub origin: EquipmentRef,
    pub affected: Vec<ImpactedDevice>,
    pub affected_cameras: usize,
    /// Cameras losing recording but still streaming
    pub cameras_without_recording: usize,
}
