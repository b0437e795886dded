//! Business logic services

pub mod auth;
pub mod email;
pub mod failures;
pub mod impact;
pub mod import;
pub mod inventory;
pub mod locations;
pub mod maintenance;
pub mod map;
pub mod photos;
pub mod stats;
pub mod technicians;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub inventory: inventory::InventoryService,
    pub locations: locations::LocationsService,
    pub technicians: technicians::TechniciansService,
    pub failures: failures::FailuresService,
    pub maintenance: maintenance::MaintenanceService,
    pub impact: impact::ImpactService,
    pub stats: stats::StatsService,
    pub map: map::MapService,
    pub notifications: email::NotificationService,
    pub photos: photos::PhotosService,
    pub import: import::ImportService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let notifications = email::NotificationService::new(config.email.clone());
        let impact = impact::ImpactService::new(repository.clone());
        let inventory = inventory::InventoryService::new(repository.clone());
        let locations = locations::LocationsService::new(repository.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            users: users::UsersService::new(repository.clone()),
            technicians: technicians::TechniciansService::new(repository.clone()),
            failures: failures::FailuresService::new(
                repository.clone(),
                notifications.clone(),
                impact.clone(),
            ),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            map: map::MapService::new(repository.clone()),
            photos: photos::PhotosService::new(repository.clone(), &config.uploads),
            import: import::ImportService::new(
                repository.clone(),
                inventory.clone(),
                locations.clone(),
                &config.uploads,
            ),
            inventory,
            locations,
            impact,
            notifications,
            repository,
        }
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
