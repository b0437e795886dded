//! Failure tickets repository

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::page_bounds;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentKind, FailurePriority, FailureStatus},
        failure::{
            CreateFailure, Failure, FailureComment, FailureDetails, FailureQuery, UpdateFailure,
        },
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT f.*,
           eq.code AS equipment_code,
           eq.name AS equipment_name,
           t.first_name || ' ' || t.last_name AS technician_name,
           COALESCE(u.full_name, u.username) AS reporter_name
    FROM failures f
    LEFT JOIN all_equipment eq ON eq.kind = f.equipment_kind AND eq.id = f.equipment_id
    LEFT JOIN technicians t ON t.id = f.assigned_technician_id
    LEFT JOIN users u ON u.id = f.reported_by
"#;

/// Ticket code from its creation year and id, e.g. `F-2024-00042`
pub fn failure_code(reported_at: DateTime<Utc>, id: i32) -> String {
    format!("F-{}-{:05}", reported_at.year(), id)
}

#[derive(Clone)]
pub struct FailuresRepository {
    pool: Pool<Postgres>,
}

impl FailuresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List failures with filters and pagination, most recent first
    pub async fn list(&self, query: &FailureQuery) -> AppResult<(Vec<FailureDetails>, i64)> {
        let (_, per_page, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM failures f");
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DETAILS_SELECT);
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY f.reported_at DESC, f.id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select
            .build_query_as::<FailureDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &FailureQuery) {
        qb.push(" WHERE NOT f.deleted");
        if let Some(status) = query.status {
            qb.push(" AND f.status = ").push_bind(status);
        }
        if query.pending.unwrap_or(false) {
            qb.push(" AND f.status IN ('open', 'assigned', 'in_progress')");
        }
        if let Some(priority) = query.priority {
            qb.push(" AND f.priority = ").push_bind(priority);
        }
        if let Some(kind) = query.equipment_kind {
            qb.push(" AND f.equipment_kind = ").push_bind(kind);
        }
        if let Some(equipment_id) = query.equipment_id {
            qb.push(" AND f.equipment_id = ").push_bind(equipment_id);
        }
        if let Some(technician_id) = query.technician_id {
            qb.push(" AND f.assigned_technician_id = ").push_bind(technician_id);
        }
        if let Some(start) = query.start_date {
            qb.push(" AND f.reported_at::date >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            qb.push(" AND f.reported_at::date <= ").push_bind(end);
        }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Failure> {
        sqlx::query_as::<_, Failure>("SELECT * FROM failures WHERE id = $1 AND NOT deleted")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Failure {} not found", id)))
    }

    pub async fn get_details(&self, id: i32) -> AppResult<FailureDetails> {
        let sql = format!("{} WHERE f.id = $1 AND NOT f.deleted", DETAILS_SELECT);
        sqlx::query_as::<_, FailureDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Failure {} not found", id)))
    }

    pub async fn get_by_code(&self, code: &str) -> AppResult<Option<Failure>> {
        let row = sqlx::query_as::<_, Failure>(
            "SELECT * FROM failures WHERE UPPER(code) = UPPER($1) AND NOT deleted",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Ticket migrated earlier under this spreadsheet reference
    pub async fn get_by_external_ref(&self, reference: &str) -> AppResult<Option<Failure>> {
        let row = sqlx::query_as::<_, Failure>(
            r#"
            SELECT * FROM failures
            WHERE UPPER(external_ref) = UPPER($1) AND NOT deleted
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Same title on the same equipment, reported on `reported_on` when given
    pub async fn find_same_report(
        &self,
        title: &str,
        equipment_kind: EquipmentKind,
        equipment_id: i32,
        reported_on: Option<NaiveDate>,
    ) -> AppResult<Option<Failure>> {
        let row = sqlx::query_as::<_, Failure>(
            r#"
            SELECT * FROM failures
            WHERE NOT deleted
              AND LOWER(title) = LOWER($1)
              AND equipment_kind = $2
              AND equipment_id = $3
              AND ($4::date IS NULL OR (reported_at AT TIME ZONE 'UTC')::date = $4)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(title)
        .bind(equipment_kind)
        .bind(equipment_id)
        .bind(reported_on)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a ticket and stamp its code
    pub async fn insert(
        conn: &mut PgConnection,
        data: &CreateFailure,
        status: FailureStatus,
        reported_by: Option<i32>,
    ) -> AppResult<Failure> {
        let created = sqlx::query_as::<_, Failure>(
            r#"
            INSERT INTO failures (
                title, description, category, priority, status, equipment_kind, equipment_id,
                reported_by, assigned_technician_id, reported_at, assigned_at, requires_maintenance,
                external_ref
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                COALESCE($10, NOW()),
                CASE WHEN $9::int IS NULL THEN NULL ELSE NOW() END,
                $11, $12
            )
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.priority.unwrap_or(FailurePriority::Medium))
        .bind(status)
        .bind(data.equipment_kind)
        .bind(data.equipment_id)
        .bind(reported_by)
        .bind(data.assigned_technician_id)
        .bind(data.reported_at)
        .bind(data.requires_maintenance.unwrap_or(false))
        .bind(&data.external_ref)
        .fetch_one(&mut *conn)
        .await?;

        let code = failure_code(created.reported_at, created.id);
        let failure = sqlx::query_as::<_, Failure>(
            "UPDATE failures SET code = $1 WHERE id = $2 RETURNING *",
        )
        .bind(code)
        .bind(created.id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(failure)
    }

    pub async fn update(&self, id: i32, data: &UpdateFailure) -> AppResult<Failure> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE failures SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "title", data.title.clone());
        set_if_some!(sep, "description", data.description.clone());
        set_if_some!(sep, "category", data.category.clone());
        set_if_some!(sep, "priority", data.priority);
        set_if_some!(sep, "requires_maintenance", data.requires_maintenance);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        qb.build_query_as::<Failure>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Failure {} not found", id)))
    }

    /// Move a ticket from `from` to `to`, stamping the matching lifecycle column.
    ///
    /// Returns `None` when the ticket is no longer in `from` (concurrent update).
    pub async fn transition(
        conn: &mut PgConnection,
        id: i32,
        from: FailureStatus,
        to: FailureStatus,
        technician_id: Option<i32>,
        resolution: Option<&str>,
    ) -> AppResult<Option<Failure>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE failures SET updated_at = NOW(), status = ");
        qb.push_bind(to);
        match to {
            FailureStatus::Assigned => {
                qb.push(", assigned_at = NOW()");
            }
            FailureStatus::InProgress => {
                qb.push(", repair_started_at = COALESCE(repair_started_at, NOW()), repair_finished_at = NULL");
            }
            FailureStatus::Resolved => {
                qb.push(", repair_finished_at = NOW()");
            }
            FailureStatus::Closed | FailureStatus::Cancelled => {
                qb.push(", closed_at = NOW()");
            }
            FailureStatus::Open => {}
        }
        if let Some(technician_id) = technician_id {
            qb.push(", assigned_technician_id = ").push_bind(technician_id);
            if to != FailureStatus::Assigned {
                qb.push(", assigned_at = COALESCE(assigned_at, NOW())");
            }
        }
        if let Some(resolution) = resolution {
            qb.push(", resolution = ").push_bind(resolution.to_string());
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND status = ")
            .push_bind(from)
            .push(" AND NOT deleted RETURNING *");

        let row = qb
            .build_query_as::<Failure>()
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Change the assignee without moving the ticket in its lifecycle
    pub async fn reassign(&self, id: i32, technician_id: i32) -> AppResult<Failure> {
        sqlx::query_as::<_, Failure>(
            r#"
            UPDATE failures
            SET assigned_technician_id = $2, assigned_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND NOT deleted
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(technician_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Failure {} not found", id)))
    }

    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE failures SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Failure {} not found", id)));
        }
        Ok(())
    }

    /// Pending tickets on a device other than `exclude_id`
    pub async fn pending_for_equipment(
        conn: &mut PgConnection,
        kind: EquipmentKind,
        equipment_id: i32,
        exclude_id: i32,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM failures
            WHERE equipment_kind = $1 AND equipment_id = $2 AND id != $3
              AND NOT deleted AND status IN ('open', 'assigned', 'in_progress')
            "#,
        )
        .bind(kind)
        .bind(equipment_id)
        .bind(exclude_id)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    pub async fn comments(&self, failure_id: i32) -> AppResult<Vec<FailureComment>> {
        let rows = sqlx::query_as::<_, FailureComment>(
            r#"
            SELECT c.id, c.failure_id, c.user_id,
                   COALESCE(u.full_name, u.username) AS author_name,
                   c.body, c.created_at
            FROM failure_comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.failure_id = $1
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(failure_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_comment(
        &self,
        failure_id: i32,
        user_id: i32,
        body: &str,
    ) -> AppResult<FailureComment> {
        let row = sqlx::query_as::<_, FailureComment>(
            r#"
            WITH inserted AS (
                INSERT INTO failure_comments (failure_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.failure_id, i.user_id,
                   COALESCE(u.full_name, u.username) AS author_name,
                   i.body, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(failure_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_failure_code_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        assert_eq!(failure_code(at, 42), "F-2024-00042");
        assert_eq!(failure_code(at, 123_456), "F-2024-123456");
    }
}
