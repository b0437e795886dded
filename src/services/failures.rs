//! Failure tickets and their lifecycle

use chrono::Utc;
use serde::Serialize;
use sqlx::PgConnection;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{
            EquipmentStatus, FailurePriority, FailureStatus, MaintenanceKind, MaintenanceStatus,
            TechnicianStatus,
        },
        failure::{
            CancelFailure, CloseFailure, CreateFailure, Failure, FailureComment, FailureDetails,
            FailureQuery, FinishRepair, UpdateFailure,
        },
        impact::ImpactAnalysis,
        maintenance::Maintenance,
        technician::Technician,
        user::SessionUser,
        EquipmentKind,
    },
    repository::{
        cameras::CamerasRepository, equipment::EquipmentRepository, failures::FailuresRepository,
        maintenance::{MaintenanceRepository, NewMaintenance},
        Repository,
    },
};

use super::{email::NotificationService, impact::ImpactService};

/// Reject a move the lifecycle does not allow
pub fn check_transition(from: FailureStatus, to: FailureStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::BusinessRule(format!(
            "Cannot move a ticket from {} to {}",
            from, to
        )))
    }
}

fn stale(id: i32) -> AppError {
    AppError::Conflict(format!("Failure {} was modified concurrently, reload and retry", id))
}

/// Result of closing a ticket
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClosedFailure {
    pub failure: Failure,
    pub maintenance: Option<Maintenance>,
}

#[derive(Clone)]
pub struct FailuresService {
    repository: Repository,
    notifications: NotificationService,
    impact: ImpactService,
}

impl FailuresService {
    pub fn new(
        repository: Repository,
        notifications: NotificationService,
        impact: ImpactService,
    ) -> Self {
        Self {
            repository,
            notifications,
            impact,
        }
    }

    pub async fn list(&self, query: &FailureQuery) -> AppResult<(Vec<FailureDetails>, i64)> {
        self.repository.failures.list(query).await
    }

    pub async fn get_details(&self, id: i32) -> AppResult<FailureDetails> {
        self.repository.failures.get_details(id).await
    }

    async fn equipment_label(&self, kind: EquipmentKind, id: i32) -> String {
        match self.repository.equipment.summary(kind, id).await {
            Ok(s) => format!("{} {} ({})", s.code, s.name, kind.label()),
            Err(_) => format!("{} #{}", kind.label(), id),
        }
    }

    /// Open a ticket; a technician makes it `assigned` right away
    pub async fn create(&self, reporter: &SessionUser, data: CreateFailure) -> AppResult<Failure> {
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
        let technician = match data.assigned_technician_id {
            Some(id) => Some(self.active_technician(id).await?),
            None => None,
        };
        let status = if technician.is_some() {
            FailureStatus::Assigned
        } else {
            FailureStatus::Open
        };
        let critical = data.priority == Some(FailurePriority::Critical);

        let mut tx = self.repository.pool.begin().await?;
        let failure =
            FailuresRepository::insert(&mut tx, &data, status, Some(reporter.user_id)).await?;
        if critical {
            let reason = format!("Critical failure {}", failure.code.as_deref().unwrap_or_default());
            EquipmentRepository::change_status_with(
                &mut tx,
                failure.equipment_kind,
                failure.equipment_id,
                EquipmentStatus::Failing,
                Some(&reason),
                Some(reporter.user_id),
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(
            failure_id = failure.id,
            code = ?failure.code,
            priority = %failure.priority,
            equipment = %failure.equipment_kind,
            equipment_id = failure.equipment_id,
            "Failure reported"
        );

        let label = self
            .equipment_label(failure.equipment_kind, failure.equipment_id)
            .await;
        if critical {
            self.notifications.critical_failure(&failure, &label).await;
        }
        if let Some(technician) = technician {
            self.notify_assignment(&failure, technician, &label).await;
        }
        Ok(failure)
    }

    pub async fn update(&self, id: i32, data: UpdateFailure) -> AppResult<Failure> {
        let current = self.repository.failures.get_by_id(id).await?;
        if matches!(current.status, FailureStatus::Closed | FailureStatus::Cancelled) {
            return Err(AppError::BusinessRule(format!(
                "Ticket is {} and can no longer be edited",
                current.status
            )));
        }
        self.repository.failures.update(id, &data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.failures.soft_delete(id).await?;
        tracing::info!(failure_id = id, "Failure deleted");
        Ok(())
    }

    /// Assign, or reassign a ticket already being handled
    pub async fn assign(&self, id: i32, technician_id: i32) -> AppResult<Failure> {
        let current = self.repository.failures.get_by_id(id).await?;
        let technician = self.active_technician(technician_id).await?;

        let failure = match current.status {
            FailureStatus::Assigned | FailureStatus::InProgress => {
                self.repository.failures.reassign(id, technician_id).await?
            }
            from => {
                check_transition(from, FailureStatus::Assigned)?;
                let mut conn = self.repository.pool.acquire().await?;
                FailuresRepository::transition(
                    &mut conn,
                    id,
                    from,
                    FailureStatus::Assigned,
                    Some(technician_id),
                    None,
                )
                .await?
                .ok_or_else(|| stale(id))?
            }
        };
        tracing::info!(failure_id = id, technician_id, "Failure assigned");

        let label = self
            .equipment_label(failure.equipment_kind, failure.equipment_id)
            .await;
        self.notify_assignment(&failure, technician, &label).await;
        Ok(failure)
    }

    /// Start (or resume after reopening) the repair
    pub async fn start_repair(&self, id: i32) -> AppResult<Failure> {
        self.move_to(id, FailureStatus::InProgress, None).await
    }

    pub async fn finish_repair(&self, id: i32, data: &FinishRepair) -> AppResult<Failure> {
        self.move_to(id, FailureStatus::Resolved, Some(data.resolution.trim()))
            .await
    }

    /// Cancel a ticket; the device it flagged is restored in the same transaction
    pub async fn cancel(&self, id: i32, data: &CancelFailure) -> AppResult<Failure> {
        let current = self.repository.failures.get_by_id(id).await?;
        check_transition(current.status, FailureStatus::Cancelled)?;

        let mut tx = self.repository.pool.begin().await?;
        let failure = FailuresRepository::transition(
            &mut tx,
            id,
            current.status,
            FailureStatus::Cancelled,
            None,
            data.reason.as_deref(),
        )
        .await?
        .ok_or_else(|| stale(id))?;
        Self::restore_equipment_with(&mut tx, &failure, None).await?;
        tx.commit().await?;

        tracing::info!(failure_id = id, from = %current.status, "Failure cancelled");
        Ok(failure)
    }

    /// Close a resolved ticket, optionally recording the corrective maintenance it took
    pub async fn close(
        &self,
        actor: &SessionUser,
        id: i32,
        data: &CloseFailure,
    ) -> AppResult<ClosedFailure> {
        let current = self.repository.failures.get_by_id(id).await?;
        check_transition(current.status, FailureStatus::Closed)?;

        let mut tx = self.repository.pool.begin().await?;
        let failure = FailuresRepository::transition(
            &mut tx,
            id,
            current.status,
            FailureStatus::Closed,
            None,
            None,
        )
        .await?
        .ok_or_else(|| stale(id))?;

        let maintenance = if data.record_maintenance || failure.requires_maintenance {
            let title = format!("Repair: {}", failure.title);
            let record = MaintenanceRepository::insert(
                &mut tx,
                &NewMaintenance {
                    title: &title,
                    description: failure.resolution.as_deref(),
                    kind: data.maintenance_kind.unwrap_or(MaintenanceKind::Corrective),
                    status: MaintenanceStatus::Completed,
                    equipment_kind: failure.equipment_kind,
                    equipment_id: failure.equipment_id,
                    failure_id: Some(failure.id),
                    technician_id: failure.assigned_technician_id,
                    scheduled_for: Some(Utc::now().date_naive()),
                    cost: data.cost,
                    downtime_minutes: data.downtime_minutes,
                    notes: data.notes.as_deref(),
                    created_by: Some(actor.user_id),
                },
            )
            .await?;
            if failure.equipment_kind == EquipmentKind::Camera {
                CamerasRepository::set_maintenance_dates(
                    &mut tx,
                    failure.equipment_id,
                    Utc::now().date_naive(),
                    None,
                )
                .await?;
            }
            Some(record)
        } else {
            None
        };

        Self::restore_equipment_with(&mut tx, &failure, Some(actor.user_id)).await?;
        tx.commit().await?;

        tracing::info!(
            failure_id = id,
            maintenance_id = maintenance.as_ref().map(|m| m.id),
            "Failure closed"
        );
        Ok(ClosedFailure {
            failure,
            maintenance,
        })
    }

    pub async fn comments(&self, id: i32) -> AppResult<Vec<FailureComment>> {
        self.repository.failures.get_by_id(id).await?;
        self.repository.failures.comments(id).await
    }

    pub async fn add_comment(&self, author: &SessionUser, id: i32, body: &str) -> AppResult<FailureComment> {
        self.repository.failures.get_by_id(id).await?;
        self.repository
            .failures
            .add_comment(id, author.user_id, body.trim())
            .await
    }

    /// Devices affected by the failed equipment
    pub async fn impact(&self, id: i32) -> AppResult<ImpactAnalysis> {
        let failure = self.repository.failures.get_by_id(id).await?;
        self.impact
            .analyze(failure.equipment_kind, failure.equipment_id)
            .await
    }

    async fn move_to(
        &self,
        id: i32,
        to: FailureStatus,
        resolution: Option<&str>,
    ) -> AppResult<Failure> {
        let current = self.repository.failures.get_by_id(id).await?;
        check_transition(current.status, to)?;
        let mut conn = self.repository.pool.acquire().await?;
        let failure =
            FailuresRepository::transition(&mut conn, id, current.status, to, None, resolution)
                .await?
                .ok_or_else(|| stale(id))?;
        tracing::info!(failure_id = id, from = %current.status, to = %to, "Failure status changed");
        Ok(failure)
    }

    async fn active_technician(&self, id: i32) -> AppResult<Technician> {
        let technician = match self.repository.technicians.get_by_id(id).await {
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Validation(format!("Technician {} does not exist", id)))
            }
            other => other?,
        };
        if technician.status != TechnicianStatus::Active {
            return Err(AppError::BusinessRule(format!(
                "Technician {} is not active",
                technician.full_name()
            )));
        }
        Ok(technician)
    }

    async fn notify_assignment(&self, failure: &Failure, mut technician: Technician, label: &str) {
        if technician.email.is_none() {
            if let Some(user_id) = technician.user_id {
                match self.repository.users.email_of(user_id).await {
                    Ok(email) => technician.email = email,
                    Err(e) => tracing::warn!(error = %e, "Could not look up technician e-mail"),
                }
            }
        }
        self.notifications
            .failure_assigned(failure, &technician, label)
            .await;
    }

    /// A failing device with no other pending ticket goes back to active
    async fn restore_equipment_with(
        conn: &mut PgConnection,
        failure: &Failure,
        actor: Option<i32>,
    ) -> AppResult<()> {
        let status = EquipmentRepository::status_with(
            &mut *conn,
            failure.equipment_kind,
            failure.equipment_id,
        )
        .await?;
        if status != Some(EquipmentStatus::Failing) {
            return Ok(());
        }
        let pending = FailuresRepository::pending_for_equipment(
            &mut *conn,
            failure.equipment_kind,
            failure.equipment_id,
            failure.id,
        )
        .await?;
        if pending > 0 {
            return Ok(());
        }
        let reason = format!(
            "Failure {} {}",
            failure.code.as_deref().unwrap_or_default(),
            failure.status
        );
        EquipmentRepository::change_status_with(
            conn,
            failure.equipment_kind,
            failure.equipment_id,
            EquipmentStatus::Active,
            Some(&reason),
            actor,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transition_maps_to_business_rule() {
        assert!(check_transition(FailureStatus::Open, FailureStatus::Assigned).is_ok());
        assert!(matches!(
            check_transition(FailureStatus::Open, FailureStatus::Closed),
            Err(AppError::BusinessRule(_))
        ));
        assert!(matches!(
            check_transition(FailureStatus::Closed, FailureStatus::Cancelled),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_resolved_ticket_can_be_reopened() {
        assert!(check_transition(FailureStatus::Resolved, FailureStatus::InProgress).is_ok());
    }
}
