//! Technicians repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::like_pattern;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::TechnicianStatus,
        technician::{
            CreateTechnician, Technician, TechnicianQuery, TechnicianWorkload, UpdateTechnician,
        },
    },
};

#[derive(Clone)]
pub struct TechniciansRepository {
    pool: Pool<Postgres>,
}

impl TechniciansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &TechnicianQuery) -> AppResult<Vec<Technician>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM technicians WHERE TRUE");
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(ref specialty) = query.specialty {
            qb.push(" AND specialty ILIKE ").push_bind(specialty.clone());
        }
        if let Some(pattern) = like_pattern(query.q.as_deref()) {
            qb.push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR employee_code ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY last_name, first_name");

        let rows = qb.build_query_as::<Technician>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Technician> {
        sqlx::query_as::<_, Technician>("SELECT * FROM technicians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Technician {} not found", id)))
    }

    pub async fn get_by_employee_code(&self, code: &str) -> AppResult<Option<Technician>> {
        let row = sqlx::query_as::<_, Technician>(
            "SELECT * FROM technicians WHERE UPPER(employee_code) = UPPER($1)",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Match a free-form "First Last" name, as written in spreadsheets
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Technician>> {
        let row = sqlx::query_as::<_, Technician>(
            r#"
            SELECT * FROM technicians
            WHERE LOWER(first_name || ' ' || last_name) = LOWER($1)
               OR LOWER(last_name || ' ' || first_name) = LOWER($1)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, data: &CreateTechnician) -> AppResult<Technician> {
        let row = sqlx::query_as::<_, Technician>(
            r#"
            INSERT INTO technicians (
                employee_code, first_name, last_name, specialty, phone, email,
                status, hired_on, user_id, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.employee_code)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.specialty)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(data.status.unwrap_or(TechnicianStatus::Active))
        .bind(data.hired_on)
        .bind(data.user_id)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i32, data: &UpdateTechnician) -> AppResult<Technician> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE technicians SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "employee_code", data.employee_code.clone());
        set_if_some!(sep, "first_name", data.first_name.clone());
        set_if_some!(sep, "last_name", data.last_name.clone());
        set_if_some!(sep, "specialty", data.specialty.clone());
        set_if_some!(sep, "phone", data.phone.clone());
        set_if_some!(sep, "email", data.email.clone());
        set_if_some!(sep, "status", data.status);
        set_if_some!(sep, "hired_on", data.hired_on);
        set_if_some!(sep, "user_id", data.user_id);
        set_if_some!(sep, "notes", data.notes.clone());
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Technician>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Technician {} not found", id)))
    }

    /// Technicians are never removed, only set inactive, so their history stays attached
    pub async fn deactivate(&self, id: i32) -> AppResult<Technician> {
        sqlx::query_as::<_, Technician>(
            "UPDATE technicians SET status = 'inactive', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Technician {} not found", id)))
    }

    pub async fn workload(&self, technician: &Technician) -> AppResult<TechnicianWorkload> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM failures
                    WHERE assigned_technician_id = $1 AND NOT deleted
                      AND status IN ('open', 'assigned')),
                (SELECT COUNT(*) FROM failures
                    WHERE assigned_technician_id = $1 AND NOT deleted AND status = 'in_progress'),
                (SELECT COUNT(*) FROM maintenance_records
                    WHERE technician_id = $1 AND NOT deleted
                      AND status IN ('scheduled', 'in_progress')),
                (SELECT COUNT(*) FROM maintenance_records
                    WHERE technician_id = $1 AND NOT deleted
                      AND status IN ('scheduled', 'in_progress') AND scheduled_for < CURRENT_DATE)
            "#,
        )
        .bind(technician.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TechnicianWorkload {
            technician_id: technician.id,
            name: technician.full_name(),
            open_failures: row.0,
            in_progress_failures: row.1,
            scheduled_maintenance: row.2,
            overdue_maintenance: row.3,
        })
    }
}
