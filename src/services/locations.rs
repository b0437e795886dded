use crate::{
    error::{AppError, AppResult},
    models::location::{
        CreateLocation, Location, LocationEquipment, LocationQuery, UpdateLocation,
    },
    repository::Repository,
};

/// Deepest campus > building > floor > room chain we walk before giving up
const MAX_DEPTH: usize = 16;

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
}

impl LocationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &LocationQuery) -> AppResult<(Vec<Location>, i64)> {
        self.repository.locations.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Location> {
        self.repository.locations.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateLocation) -> AppResult<Location> {
        if let Some(ref code) = data.code {
            if self.repository.locations.code_exists(code, None).await? {
                return Err(AppError::Conflict(format!("Location code {} already exists", code)));
            }
        }
        if let Some(parent_id) = data.parent_id {
            if !self.repository.locations.exists(parent_id).await? {
                return Err(AppError::Validation(format!(
                    "Parent location {} does not exist",
                    parent_id
                )));
            }
        }
        let location = self.repository.locations.create(&data).await?;
        tracing::info!(location_id = location.id, name = %location.name, "Location created");
        Ok(location)
    }

    pub async fn update(&self, id: i32, data: UpdateLocation) -> AppResult<Location> {
        self.repository.locations.get_by_id(id).await?;
        if let Some(ref code) = data.code {
            if self.repository.locations.code_exists(code, Some(id)).await? {
                return Err(AppError::Conflict(format!("Location code {} already exists", code)));
            }
        }
        if let Some(parent_id) = data.parent_id {
            self.check_parent(id, parent_id).await?;
        }
        self.repository.locations.update(id, &data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.locations.delete(id).await?;
        tracing::info!(location_id = id, "Location deleted");
        Ok(())
    }

    pub async fn children(&self, id: i32) -> AppResult<Vec<Location>> {
        self.repository.locations.get_by_id(id).await?;
        self.repository.locations.children(id).await
    }

    pub async fn equipment(&self, id: i32) -> AppResult<LocationEquipment> {
        self.repository.locations.get_by_id(id).await?;
        self.repository.locations.equipment_counts(id).await
    }

    /// The new parent must exist and must not be the location itself or one of its descendants
    async fn check_parent(&self, id: i32, parent_id: i32) -> AppResult<()> {
        let mut current = Some(parent_id);
        for _ in 0..MAX_DEPTH {
            let Some(ancestor) = current else {
                return Ok(());
            };
            if ancestor == id {
                return Err(AppError::Validation(
                    "A location cannot be nested inside itself".to_string(),
                ));
            }
            current = match self.repository.locations.get_by_id(ancestor).await {
                Ok(location) => location.parent_id,
                Err(AppError::NotFound(_)) => {
                    return Err(AppError::Validation(format!(
                        "Parent location {} does not exist",
                        ancestor
                    )))
                }
                Err(e) => return Err(e),
            };
        }
        Err(AppError::Validation("Location hierarchy is too deep".to_string()))
    }
}
