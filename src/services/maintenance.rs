//! Maintenance records: scheduling, execution and camera service dates

use chrono::{Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentKind, MaintenanceStatus},
        maintenance::{
            CompleteMaintenance, CreateMaintenance, Maintenance, MaintenanceQuery,
            UpdateMaintenance,
        },
        user::SessionUser,
    },
    repository::{
        cameras::CamerasRepository,
        maintenance::{MaintenanceRepository, NewMaintenance},
        Repository,
    },
};

const DEFAULT_UPCOMING_DAYS: i64 = 7;
const MAX_UPCOMING_DAYS: i64 = 365;

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &MaintenanceQuery) -> AppResult<(Vec<Maintenance>, i64)> {
        self.repository.maintenance.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Maintenance> {
        self.repository.maintenance.get_by_id(id).await
    }

    pub async fn create(&self, actor: &SessionUser, data: CreateMaintenance) -> AppResult<Maintenance> {
        if !self
            .repository
            .equipment
            .exists(data.equipment_kind, data.equipment_id)
            .await?
        {
            return Err(AppError::Validation(format!(
                "{} {} does not exist",
                data.equipment_kind.label(),
                data.equipment_id
            )));
        }
        if let Some(technician_id) = data.technician_id {
            self.repository.technicians.get_by_id(technician_id).await?;
        }
        if let Some(failure_id) = data.failure_id {
            let failure = self.repository.failures.get_by_id(failure_id).await?;
            if failure.equipment_kind != data.equipment_kind
                || failure.equipment_id != data.equipment_id
            {
                return Err(AppError::Validation(
                    "The linked failure belongs to different equipment".to_string(),
                ));
            }
        }

        let mut conn = self.repository.pool.acquire().await?;
        let record = MaintenanceRepository::insert(
            &mut conn,
            &NewMaintenance::scheduled(&data, Some(actor.user_id)),
        )
        .await?;
        tracing::info!(maintenance_id = record.id, code = ?record.code, "Maintenance scheduled");
        Ok(record)
    }

    pub async fn update(&self, id: i32, data: UpdateMaintenance) -> AppResult<Maintenance> {
        let current = self.repository.maintenance.get_by_id(id).await?;
        if matches!(
            current.status,
            MaintenanceStatus::Completed | MaintenanceStatus::Cancelled
        ) {
            return Err(AppError::BusinessRule(format!(
                "Maintenance is {} and can no longer be edited",
                current.status
            )));
        }
        if let Some(technician_id) = data.technician_id {
            self.repository.technicians.get_by_id(technician_id).await?;
        }
        self.repository.maintenance.update(id, &data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.maintenance.soft_delete(id).await
    }

    /// scheduled -> in_progress
    pub async fn start(&self, id: i32) -> AppResult<Maintenance> {
        let current = self.repository.maintenance.get_by_id(id).await?;
        self.repository
            .maintenance
            .start(id)
            .await?
            .ok_or_else(|| not_allowed(&current, "started"))
    }

    /// Finish the work; a camera gets its maintenance dates refreshed in the same transaction
    pub async fn complete(&self, id: i32, data: &CompleteMaintenance) -> AppResult<Maintenance> {
        let current = self.repository.maintenance.get_by_id(id).await?;

        let mut tx = self.repository.pool.begin().await?;
        let record = MaintenanceRepository::complete(&mut tx, id, data)
            .await?
            .ok_or_else(|| not_allowed(&current, "completed"))?;
        if record.equipment_kind == EquipmentKind::Camera {
            CamerasRepository::set_maintenance_dates(
                &mut tx,
                record.equipment_id,
                Utc::now().date_naive(),
                data.next_maintenance_on,
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(maintenance_id = id, "Maintenance completed");
        Ok(record)
    }

    pub async fn cancel(&self, id: i32) -> AppResult<Maintenance> {
        let current = self.repository.maintenance.get_by_id(id).await?;
        self.repository
            .maintenance
            .cancel(id)
            .await?
            .ok_or_else(|| not_allowed(&current, "cancelled"))
    }

    /// Pending records scheduled within the next `days` days
    pub async fn upcoming(&self, days: Option<i64>) -> AppResult<Vec<Maintenance>> {
        let days = days
            .unwrap_or(DEFAULT_UPCOMING_DAYS)
            .clamp(0, MAX_UPCOMING_DAYS);
        let until = Utc::now().date_naive() + Duration::days(days);
        self.repository.maintenance.upcoming(until).await
    }

    pub async fn overdue(&self) -> AppResult<Vec<Maintenance>> {
        self.repository.maintenance.overdue(None).await
    }
}

fn not_allowed(current: &Maintenance, action: &str) -> AppError {
    AppError::BusinessRule(format!(
        "Maintenance in status {} cannot be {}",
        current.status, action
    ))
}
