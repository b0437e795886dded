//! Repository layer for database operations

/// Appends `col = $n` to an UPDATE's SET list when the value is present
macro_rules! set_if_some {
    ($sep:expr, $col:literal, $value:expr) => {
        if let Some(value) = $value {
            $sep.push(concat!($col, " = ")).push_bind_unseparated(value);
        }
    };
}

pub mod cabinets;
pub mod cameras;
pub mod equipment;
pub mod failures;
pub mod imports;
pub mod locations;
pub mod maintenance;
pub mod network_links;
pub mod nvrs;
pub mod photos;
pub mod power_supplies;
pub mod sessions;
pub mod stats;
pub mod switches;
pub mod technicians;
pub mod ups;
pub mod users;

use sqlx::{Pool, Postgres};

const DEFAULT_PER_PAGE: i64 = 50;
const MAX_PER_PAGE: i64 = 500;

/// Resolve pagination parameters into (page, per_page, offset)
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page, (page - 1) * per_page)
}

/// `%term%` pattern for ILIKE searches, `None` for blank input
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t.replace('%', "\\%").replace('_', "\\_")))
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub cameras: cameras::CamerasRepository,
    pub switches: switches::SwitchesRepository,
    pub nvrs: nvrs::NvrsRepository,
    pub ups: ups::UpsRepository,
    pub power_supplies: power_supplies::PowerSuppliesRepository,
    pub cabinets: cabinets::CabinetsRepository,
    pub locations: locations::LocationsRepository,
    pub technicians: technicians::TechniciansRepository,
    pub failures: failures::FailuresRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub users: users::UsersRepository,
    pub sessions: sessions::SessionsRepository,
    pub photos: photos::PhotosRepository,
    pub network_links: network_links::NetworkLinksRepository,
    pub stats: stats::StatsRepository,
    pub imports: imports::ImportsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            cameras: cameras::CamerasRepository::new(pool.clone()),
            switches: switches::SwitchesRepository::new(pool.clone()),
            nvrs: nvrs::NvrsRepository::new(pool.clone()),
            ups: ups::UpsRepository::new(pool.clone()),
            power_supplies: power_supplies::PowerSuppliesRepository::new(pool.clone()),
            cabinets: cabinets::CabinetsRepository::new(pool.clone()),
            locations: locations::LocationsRepository::new(pool.clone()),
            technicians: technicians::TechniciansRepository::new(pool.clone()),
            failures: failures::FailuresRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            sessions: sessions::SessionsRepository::new(pool.clone()),
            photos: photos::PhotosRepository::new(pool.clone()),
            network_links: network_links::NetworkLinksRepository::new(pool.clone()),
            stats: stats::StatsRepository::new(pool.clone()),
            imports: imports::ImportsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (1, 50, 0));
        assert_eq!(page_bounds(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(page_bounds(Some(0), Some(10_000)), (1, 500, 0));
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern(Some(" cam ")), Some("%cam%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(Some("10_0")), Some("%10\\_0%".to_string()));
        assert_eq!(like_pattern(None), None);
    }
}
