//! Data models for Camtrack

pub mod cabinet;
pub mod camera;
pub mod enums;
pub mod equipment;
pub mod failure;
pub mod impact;
pub mod import_report;
pub mod location;
pub mod maintenance;
pub mod map;
pub mod network_link;
pub mod nvr;
pub mod photo;
pub mod power_supply;
pub mod report;
pub mod switch;
pub mod technician;
pub mod ups;
pub mod user;

// Re-export commonly used types
pub use cabinet::Cabinet;
pub use camera::Camera;
pub use enums::{EquipmentKind, EquipmentStatus, FailurePriority, FailureStatus, UserRole};
pub use equipment::{EquipmentCore, EquipmentSummary};
pub use failure::Failure;
pub use location::Location;
pub use maintenance::Maintenance;
pub use nvr::Nvr;
pub use power_supply::PowerSupply;
pub use switch::Switch;
pub use technician::Technician;
pub use ups::Ups;
pub use user::{SessionUser, User};
