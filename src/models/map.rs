//! Payloads consumed by the map UI

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{CameraType, EquipmentStatus};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MapCameraQuery {
    pub building: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub camera_type: Option<CameraType>,
}

/// Marker class used by the map to pick an icon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerClass {
    Active,
    Inactive,
    Maintenance,
}

impl From<EquipmentStatus> for MarkerClass {
    fn from(status: EquipmentStatus) -> Self {
        match status {
            EquipmentStatus::Active => MarkerClass::Active,
            EquipmentStatus::Maintenance => MarkerClass::Maintenance,
            _ => MarkerClass::Inactive,
        }
    }
}

/// Camera row joined with its location, as read for the map
#[derive(Debug, Clone, FromRow)]
pub struct MapCameraRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub status: EquipmentStatus,
    pub camera_type: Option<CameraType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_id: Option<i32>,
    pub location_name: Option<String>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    pub open_failures: i64,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CameraMarker {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub status: EquipmentStatus,
    pub camera_type: Option<CameraType>,
    pub lat: f64,
    pub lng: f64,
    pub marker: MarkerClass,
    pub location: Option<String>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub open_failures: i64,
}

impl CameraMarker {
    /// Uses the camera's own coordinates, then its location's; `None` if neither is set
    pub fn from_row(row: MapCameraRow) -> Option<Self> {
        let (lat, lng) = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => (row.location_latitude?, row.location_longitude?),
        };
        Some(Self {
            id: row.id,
            code: row.code,
            name: row.name,
            ip_address: row.ip_address,
            status: row.status,
            camera_type: row.camera_type,
            lat,
            lng,
            marker: MarkerClass::from(row.status),
            location: row.location_name,
            campus: row.campus,
            building: row.building,
            floor: row.floor,
            open_failures: row.open_failures,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapCamerasResponse {
    pub success: bool,
    pub cameras: Vec<CameraMarker>,
    pub total: usize,
    /// Cameras matching the filters but lacking coordinates
    pub without_coordinates: usize,
    pub applied_filters: AppliedFilters,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedFilters {
    pub building: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub camera_type: Option<CameraType>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuildingsResponse {
    pub success: bool,
    pub buildings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MapLocation {
    pub id: i32,
    pub name: String,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub cameras: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapLocationsResponse {
    pub success: bool,
    pub locations: Vec<MapLocation>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BuildingStats {
    pub building: String,
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapStatsResponse {
    pub success: bool,
    pub total_cameras: i64,
    pub active: i64,
    pub inactive: i64,
    pub maintenance: i64,
    pub georeferenced: i64,
    pub buildings: i64,
    pub per_building: Vec<BuildingStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MapCameraRow {
        MapCameraRow {
            id: 1,
            code: "CAM-001".into(),
            name: "Entrance".into(),
            ip_address: None,
            status: EquipmentStatus::Failing,
            camera_type: Some(CameraType::Dome),
            latitude: None,
            longitude: None,
            location_id: Some(3),
            location_name: Some("Library".into()),
            campus: None,
            building: Some("Library".into()),
            floor: None,
            location_latitude: Some(-36.6),
            location_longitude: Some(-72.1),
            open_failures: 2,
        }
    }

    #[test]
    fn test_marker_falls_back_to_location_coordinates() {
        let marker = CameraMarker::from_row(row()).unwrap();
        assert_eq!(marker.lat, -36.6);
        assert_eq!(marker.marker, MarkerClass::Inactive);
    }

    #[test]
    fn test_marker_prefers_camera_coordinates() {
        let mut r = row();
        r.latitude = Some(1.0);
        r.longitude = Some(2.0);
        let marker = CameraMarker::from_row(r).unwrap();
        assert_eq!((marker.lat, marker.lng), (1.0, 2.0));
    }

    #[test]
    fn test_marker_without_coordinates() {
        let mut r = row();
        r.location_latitude = None;
        assert!(CameraMarker::from_row(r).is_none());
    }
}
