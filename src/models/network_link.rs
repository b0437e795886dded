//! Explicit network dependencies between equipment (uplinks, fiber runs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{EquipmentKind, LinkType};

/// Directed link: the target loses connectivity when the source goes down
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NetworkLink {
    pub id: i32,
    pub source_kind: EquipmentKind,
    pub source_id: i32,
    pub target_kind: EquipmentKind,
    pub target_id: i32,
    pub link_type: LinkType,
    pub source_port: Option<String>,
    pub target_port: Option<String>,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNetworkLink {
    pub source_kind: EquipmentKind,
    pub source_id: i32,
    pub target_kind: EquipmentKind,
    pub target_id: i32,
    pub link_type: Option<LinkType>,
    #[validate(length(max = 20))]
    pub source_port: Option<String>,
    #[validate(length(max = 20))]
    pub target_port: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NetworkLinkQuery {
    pub kind: Option<EquipmentKind>,
    pub id: Option<i32>,
}
