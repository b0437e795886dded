//! Shared domain enums
//!
//! Every enum is stored as lowercase text in Postgres and serialized as the
//! same snake_case string in JSON.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $value ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $( $value => Ok($name::$variant), )+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as Decode<'r, Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Operational status shared by every equipment kind
    pub enum EquipmentStatus {
        Active = "active",
        Inactive = "inactive",
        Failing = "failing",
        Maintenance = "maintenance",
        Decommissioned = "decommissioned",
    }
}

impl EquipmentStatus {
    /// Whether the device is currently doing its job
    pub fn is_operational(&self) -> bool {
        matches!(self, EquipmentStatus::Active)
    }
}

text_enum! {
    /// Equipment tables addressable through the loosely typed `kind + id` pair
    pub enum EquipmentKind {
        Camera = "camera",
        Switch = "switch",
        Nvr = "nvr",
        Ups = "ups",
        PowerSupply = "power_supply",
        Cabinet = "cabinet",
    }
}

impl EquipmentKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EquipmentKind::Camera => "cameras",
            EquipmentKind::Switch => "switches",
            EquipmentKind::Nvr => "nvrs",
            EquipmentKind::Ups => "ups_units",
            EquipmentKind::PowerSupply => "power_supplies",
            EquipmentKind::Cabinet => "cabinets",
        }
    }

    /// Prefix used when a code has to be derived from a name
    pub fn code_prefix(&self) -> &'static str {
        match self {
            EquipmentKind::Camera => "CAM",
            EquipmentKind::Switch => "SW",
            EquipmentKind::Nvr => "NVR",
            EquipmentKind::Ups => "UPS",
            EquipmentKind::PowerSupply => "PS",
            EquipmentKind::Cabinet => "GAB",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentKind::Camera => "Camera",
            EquipmentKind::Switch => "Switch",
            EquipmentKind::Nvr => "NVR/DVR",
            EquipmentKind::Ups => "UPS",
            EquipmentKind::PowerSupply => "Power supply",
            EquipmentKind::Cabinet => "Cabinet",
        }
    }
}

text_enum! {
    pub enum CameraType {
        Dome = "dome",
        Bullet = "bullet",
        Ptz = "ptz",
        Fisheye = "fisheye",
        Box = "box",
    }
}

text_enum! {
    pub enum RecorderType {
        Nvr = "nvr",
        Dvr = "dvr",
        Hybrid = "hybrid",
    }
}

text_enum! {
    pub enum CabinetType {
        Wall = "wall",
        Rack = "rack",
        Outdoor = "outdoor",
        Floor = "floor",
    }
}

text_enum! {
    pub enum LocationKind {
        Campus = "campus",
        Building = "building",
        Floor = "floor",
        Room = "room",
        Outdoor = "outdoor",
    }
}

text_enum! {
    pub enum TechnicianStatus {
        Active = "active",
        Inactive = "inactive",
        OnLeave = "on_leave",
    }
}

text_enum! {
    pub enum FailurePriority {
        Low = "low",
        Medium = "medium",
        High = "high",
        Critical = "critical",
    }
}

impl FailurePriority {
    /// Sort weight, higher is more urgent
    pub fn weight(&self) -> u8 {
        match self {
            FailurePriority::Low => 1,
            FailurePriority::Medium => 2,
            FailurePriority::High => 3,
            FailurePriority::Critical => 4,
        }
    }
}

text_enum! {
    /// Failure ticket lifecycle
    pub enum FailureStatus {
        Open = "open",
        Assigned = "assigned",
        InProgress = "in_progress",
        Resolved = "resolved",
        Closed = "closed",
        Cancelled = "cancelled",
    }
}

impl FailureStatus {
    /// Allowed lifecycle moves
    pub fn can_transition_to(&self, next: FailureStatus) -> bool {
        use FailureStatus::*;
        match (self, next) {
            (Open, Assigned) | (Open, InProgress) => true,
            (Assigned, InProgress) => true,
            (InProgress, Resolved) => true,
            (Resolved, Closed) | (Resolved, InProgress) => true,
            (Closed, _) | (Cancelled, _) => false,
            (_, Cancelled) => true,
            _ => false,
        }
    }

    /// Not yet resolved, closed or cancelled
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            FailureStatus::Open | FailureStatus::Assigned | FailureStatus::InProgress
        )
    }

    pub const PENDING: &'static [FailureStatus] = &[
        FailureStatus::Open,
        FailureStatus::Assigned,
        FailureStatus::InProgress,
    ];
}

text_enum! {
    pub enum MaintenanceKind {
        Preventive = "preventive",
        Corrective = "corrective",
        Predictive = "predictive",
        Emergency = "emergency",
    }
}

text_enum! {
    pub enum MaintenanceStatus {
        Scheduled = "scheduled",
        InProgress = "in_progress",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

text_enum! {
    /// Account role, resolved to per-resource rights through the permission table
    pub enum UserRole {
        Superadmin = "superadmin",
        Admin = "admin",
        Technician = "technician",
        Viewer = "viewer",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Viewer
    }
}

text_enum! {
    pub enum LinkType {
        Ethernet = "ethernet",
        Fiber = "fiber",
        Wireless = "wireless",
    }
}

text_enum! {
    /// Record a photo is attached to
    pub enum PhotoOwner {
        Failure = "failure",
        Maintenance = "maintenance",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Active".parse::<EquipmentStatus>(), Ok(EquipmentStatus::Active));
        assert_eq!(" power_supply ".parse::<EquipmentKind>(), Ok(EquipmentKind::PowerSupply));
        assert!("router".parse::<EquipmentKind>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for kind in EquipmentKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        for status in FailureStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_failure_lifecycle() {
        use FailureStatus::*;
        assert!(Open.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));
        assert!(Resolved.can_transition_to(Closed));
        assert!(Resolved.can_transition_to(InProgress));
        assert!(Open.can_transition_to(Cancelled));
        assert!(!Open.can_transition_to(Closed));
        assert!(!Open.can_transition_to(Resolved));
        assert!(!Closed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Open));
        assert!(!Closed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_tables_are_distinct() {
        let mut tables: Vec<_> = EquipmentKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), EquipmentKind::ALL.len());
    }
}
