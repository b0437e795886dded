//! Maintenance records repository

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::page_bounds;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentKind, MaintenanceKind, MaintenanceStatus},
        maintenance::{
            CompleteMaintenance, CreateMaintenance, Maintenance, MaintenanceQuery,
            UpdateMaintenance,
        },
    },
};

/// Record code from its creation year and id, e.g. `M-2024-00007`
pub fn maintenance_code(created_at: DateTime<Utc>, id: i32) -> String {
    format!("M-{}-{:05}", created_at.year(), id)
}

/// Values for a new maintenance row, shared by the API and failure closing
#[derive(Debug, Clone)]
pub struct NewMaintenance<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub equipment_kind: EquipmentKind,
    pub equipment_id: i32,
    pub failure_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub scheduled_for: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub downtime_minutes: Option<i32>,
    pub notes: Option<&'a str>,
    pub created_by: Option<i32>,
}

impl<'a> NewMaintenance<'a> {
    pub fn scheduled(data: &'a CreateMaintenance, created_by: Option<i32>) -> Self {
        Self {
            title: &data.title,
            description: data.description.as_deref(),
            kind: data.kind.unwrap_or(MaintenanceKind::Preventive),
            status: MaintenanceStatus::Scheduled,
            equipment_kind: data.equipment_kind,
            equipment_id: data.equipment_id,
            failure_id: data.failure_id,
            technician_id: data.technician_id,
            scheduled_for: data.scheduled_for,
            cost: data.cost,
            downtime_minutes: None,
            notes: data.notes.as_deref(),
            created_by,
        }
    }
}

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &MaintenanceQuery) -> AppResult<(Vec<Maintenance>, i64)> {
        let (_, per_page, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM maintenance_records");
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM maintenance_records");
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY COALESCE(scheduled_for, created_at::date) DESC, id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select
            .build_query_as::<Maintenance>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &MaintenanceQuery) {
        qb.push(" WHERE NOT deleted");
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(kind) = query.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }
        if let Some(equipment_kind) = query.equipment_kind {
            qb.push(" AND equipment_kind = ").push_bind(equipment_kind);
        }
        if let Some(equipment_id) = query.equipment_id {
            qb.push(" AND equipment_id = ").push_bind(equipment_id);
        }
        if let Some(technician_id) = query.technician_id {
            qb.push(" AND technician_id = ").push_bind(technician_id);
        }
        if let Some(start) = query.start_date {
            qb.push(" AND COALESCE(scheduled_for, created_at::date) >= ")
                .push_bind(start);
        }
        if let Some(end) = query.end_date {
            qb.push(" AND COALESCE(scheduled_for, created_at::date) <= ")
                .push_bind(end);
        }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Maintenance> {
        sqlx::query_as::<_, Maintenance>(
            "SELECT * FROM maintenance_records WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance record {} not found", id)))
    }

    /// Insert a record and stamp its code
    pub async fn insert(conn: &mut PgConnection, data: &NewMaintenance<'_>) -> AppResult<Maintenance> {
        let finished = data.status == MaintenanceStatus::Completed;
        let created = sqlx::query_as::<_, Maintenance>(
            r#"
            INSERT INTO maintenance_records (
                title, description, kind, status, equipment_kind, equipment_id, failure_id,
                technician_id, scheduled_for, cost, downtime_minutes, notes, created_by,
                started_at, finished_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                CASE WHEN $14 THEN NOW() ELSE NULL END,
                CASE WHEN $14 THEN NOW() ELSE NULL END
            )
            RETURNING *
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.kind)
        .bind(data.status)
        .bind(data.equipment_kind)
        .bind(data.equipment_id)
        .bind(data.failure_id)
        .bind(data.technician_id)
        .bind(data.scheduled_for)
        .bind(data.cost)
        .bind(data.downtime_minutes)
        .bind(data.notes)
        .bind(data.created_by)
        .bind(finished)
        .fetch_one(&mut *conn)
        .await?;

        let record = sqlx::query_as::<_, Maintenance>(
            "UPDATE maintenance_records SET code = $1 WHERE id = $2 RETURNING *",
        )
        .bind(maintenance_code(created.created_at, created.id))
        .bind(created.id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(record)
    }

    pub async fn update(&self, id: i32, data: &UpdateMaintenance) -> AppResult<Maintenance> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE maintenance_records SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "title", data.title.clone());
        set_if_some!(sep, "description", data.description.clone());
        set_if_some!(sep, "kind", data.kind);
        set_if_some!(sep, "technician_id", data.technician_id);
        set_if_some!(sep, "scheduled_for", data.scheduled_for);
        set_if_some!(sep, "cost", data.cost);
        set_if_some!(sep, "downtime_minutes", data.downtime_minutes);
        set_if_some!(sep, "notes", data.notes.clone());
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        qb.build_query_as::<Maintenance>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance record {} not found", id)))
    }

    /// scheduled -> in_progress; `None` if the record was not scheduled
    pub async fn start(&self, id: i32) -> AppResult<Option<Maintenance>> {
        let row = sqlx::query_as::<_, Maintenance>(
            r#"
            UPDATE maintenance_records
            SET status = 'in_progress', started_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'scheduled' AND NOT deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// scheduled | in_progress -> completed
    pub async fn complete(
        conn: &mut PgConnection,
        id: i32,
        data: &CompleteMaintenance,
    ) -> AppResult<Option<Maintenance>> {
        let row = sqlx::query_as::<_, Maintenance>(
            r#"
            UPDATE maintenance_records
            SET status = 'completed',
                started_at = COALESCE(started_at, NOW()),
                finished_at = NOW(),
                notes = COALESCE($2, notes),
                cost = COALESCE($3, cost),
                downtime_minutes = COALESCE($4, downtime_minutes),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('scheduled', 'in_progress') AND NOT deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.notes)
        .bind(data.cost)
        .bind(data.downtime_minutes)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// scheduled | in_progress -> cancelled
    pub async fn cancel(&self, id: i32) -> AppResult<Option<Maintenance>> {
        let row = sqlx::query_as::<_, Maintenance>(
            r#"
            UPDATE maintenance_records
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status IN ('scheduled', 'in_progress') AND NOT deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE maintenance_records SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Maintenance record {} not found", id)));
        }
        Ok(())
    }

    /// Pending records scheduled between today and `until` inclusive
    pub async fn upcoming(&self, until: NaiveDate) -> AppResult<Vec<Maintenance>> {
        let rows = sqlx::query_as::<_, Maintenance>(
            r#"
            SELECT * FROM maintenance_records
            WHERE NOT deleted AND status IN ('scheduled', 'in_progress')
              AND scheduled_for >= CURRENT_DATE AND scheduled_for <= $1
            ORDER BY scheduled_for, id
            "#,
        )
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Pending records whose scheduled date has passed
    pub async fn overdue(&self, limit: Option<i64>) -> AppResult<Vec<Maintenance>> {
        let rows = sqlx::query_as::<_, Maintenance>(
            r#"
            SELECT * FROM maintenance_records
            WHERE NOT deleted AND status IN ('scheduled', 'in_progress')
              AND scheduled_for < CURRENT_DATE
            ORDER BY scheduled_for, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_maintenance_code_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 8, 30, 0).unwrap();
        assert_eq!(maintenance_code(at, 7), "M-2025-00007");
    }
}
