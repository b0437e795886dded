//! Import batch log

use sqlx::{types::Json, Pool, Postgres};

use crate::{error::AppResult, models::import_report::ImportReport};

#[derive(Clone)]
pub struct ImportsRepository {
    pool: Pool<Postgres>,
}

impl ImportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Persist the outcome of a batch
    pub async fn save(&self, report: &ImportReport, imported_by: Option<i32>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO import_batches (
                batch_id, kind, file_name, dry_run, rows_read, created, updated, skipped,
                warnings, imported_by, started_at, finished_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(report.batch_id)
        .bind(report.kind.as_str())
        .bind(&report.file_name)
        .bind(report.dry_run)
        .bind(report.rows_read as i32)
        .bind(report.created as i32)
        .bind(report.updated as i32)
        .bind(report.skipped as i32)
        .bind(Json(&report.warnings))
        .bind(imported_by)
        .bind(report.started_at)
        .bind(report.finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
