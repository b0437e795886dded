use crate::{
    error::AppResult,
    models::map::{
        AppliedFilters, BuildingsResponse, CameraMarker, MapCameraQuery, MapCameraRow,
        MapCamerasResponse, MapLocationsResponse, MapStatsResponse,
    },
    repository::Repository,
};

/// Split rows into markers and a count of cameras that could not be placed
pub fn markers(rows: Vec<MapCameraRow>) -> (Vec<CameraMarker>, usize) {
    let read = rows.len();
    let markers: Vec<CameraMarker> = rows.into_iter().filter_map(CameraMarker::from_row).collect();
    let missing = read - markers.len();
    (markers, missing)
}

#[derive(Clone)]
pub struct MapService {
    repository: Repository,
}

impl MapService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn cameras(&self, query: MapCameraQuery) -> AppResult<MapCamerasResponse> {
        let query = MapCameraQuery {
            building: query
                .building
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            ..query
        };
        let rows = self.repository.stats.map_cameras(&query).await?;
        let (cameras, without_coordinates) = markers(rows);
        if without_coordinates > 0 {
            tracing::debug!(without_coordinates, "Cameras left off the map");
        }

        Ok(MapCamerasResponse {
            success: true,
            total: cameras.len(),
            cameras,
            without_coordinates,
            applied_filters: AppliedFilters {
                building: query.building,
                status: query.status,
                camera_type: query.camera_type,
            },
        })
    }

    pub async fn buildings(&self) -> AppResult<BuildingsResponse> {
        Ok(BuildingsResponse {
            success: true,
            buildings: self.repository.locations.buildings().await?,
        })
    }

    pub async fn locations(&self) -> AppResult<MapLocationsResponse> {
        Ok(MapLocationsResponse {
            success: true,
            locations: self.repository.stats.map_locations().await?,
        })
    }

    pub async fn stats(&self) -> AppResult<MapStatsResponse> {
        let (total, active, inactive, maintenance, georeferenced) =
            self.repository.stats.map_camera_totals().await?;
        let per_building = self.repository.stats.cameras_per_building().await?;
        Ok(MapStatsResponse {
            success: true,
            total_cameras: total,
            active,
            inactive,
            maintenance,
            georeferenced,
            buildings: per_building.len() as i64,
            per_building,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{enums::EquipmentStatus, map::MarkerClass};

    fn row(id: i32, own: Option<(f64, f64)>, location: Option<(f64, f64)>) -> MapCameraRow {
        MapCameraRow {
            id,
            code: format!("CAM-{id:03}"),
            name: format!("Camera {id}"),
            ip_address: None,
            status: EquipmentStatus::Maintenance,
            camera_type: None,
            latitude: own.map(|c| c.0),
            longitude: own.map(|c| c.1),
            location_id: None,
            location_name: None,
            campus: None,
            building: None,
            floor: None,
            location_latitude: location.map(|c| c.0),
            location_longitude: location.map(|c| c.1),
            open_failures: 0,
        }
    }

    #[test]
    fn test_markers_fall_back_to_location() {
        let rows = vec![
            row(1, Some((-33.45, -70.66)), None),
            row(2, None, Some((-33.40, -70.60))),
            row(3, None, None),
        ];
        let (markers, missing) = markers(rows);
        assert_eq!(markers.len(), 2);
        assert_eq!(missing, 1);
        assert_eq!(markers[1].lat, -33.40);
        assert_eq!(markers[0].marker, MarkerClass::Maintenance);
    }
}
