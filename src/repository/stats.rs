//! Aggregate queries behind the dashboard, reports and map

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::AppResult,
    models::{
        equipment::EquipmentSummary,
        map::{BuildingStats, MapCameraQuery, MapCameraRow, MapLocation},
        report::{DailyCount, DashboardTotals, TopEquipment},
    },
};

#[derive(Clone)]
pub struct StatsRepository {
    pool: Pool<Postgres>,
}

impl StatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn dashboard_totals(&self) -> AppResult<DashboardTotals> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM cameras WHERE NOT deleted) AS cameras,
                (SELECT COUNT(*) FROM cameras WHERE NOT deleted AND status = 'active') AS active_cameras,
                (SELECT COUNT(*) FROM failures WHERE NOT deleted) AS failures,
                (SELECT COUNT(*) FROM failures WHERE NOT deleted AND status IN ('open', 'assigned')) AS open_failures,
                (SELECT COUNT(*) FROM failures WHERE NOT deleted AND status = 'in_progress') AS in_progress_failures,
                (SELECT COUNT(*) FROM maintenance_records WHERE NOT deleted) AS maintenance,
                (SELECT COUNT(*) FROM locations WHERE NOT deleted) AS locations,
                (SELECT COUNT(*) FROM switches WHERE NOT deleted) AS switches,
                (SELECT COUNT(*) FROM nvrs WHERE NOT deleted) AS nvrs,
                (SELECT COUNT(*) FROM ups_units WHERE NOT deleted) AS ups_units,
                (SELECT COUNT(*) FROM power_supplies WHERE NOT deleted) AS power_supplies,
                (SELECT COUNT(*) FROM cabinets WHERE NOT deleted) AS cabinets
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardTotals {
            users: row.get("users"),
            cameras: row.get("cameras"),
            active_cameras: row.get("active_cameras"),
            failures: row.get("failures"),
            open_failures: row.get("open_failures"),
            in_progress_failures: row.get("in_progress_failures"),
            maintenance: row.get("maintenance"),
            locations: row.get("locations"),
            switches: row.get("switches"),
            nvrs: row.get("nvrs"),
            ups_units: row.get("ups_units"),
            power_supplies: row.get("power_supplies"),
            cabinets: row.get("cabinets"),
        })
    }

    /// Failures already resolved or closed
    pub async fn resolved_failures(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM failures WHERE NOT deleted AND status IN ('resolved', 'closed')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn critical_open_failures(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM failures
            WHERE NOT deleted AND priority = 'critical' AND status IN ('open', 'assigned', 'in_progress')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn failures_since(&self, since: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM failures WHERE NOT deleted AND reported_at::date >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn maintenance_completed_since(&self, since: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_records
            WHERE NOT deleted AND status = 'completed' AND finished_at::date >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Cameras not operating normally, worst first
    pub async fn cameras_needing_attention(&self, limit: i64) -> AppResult<Vec<EquipmentSummary>> {
        let rows = sqlx::query_as::<_, EquipmentSummary>(
            r#"
            SELECT 'camera' AS kind, id, code, name, ip_address, status, location_id
            FROM cameras
            WHERE NOT deleted AND status IN ('failing', 'inactive', 'maintenance')
            ORDER BY CASE status WHEN 'failing' THEN 0 WHEN 'inactive' THEN 1 ELSE 2 END, updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cameras with at least one pending ticket
    pub async fn cameras_with_open_failures(&self, limit: i64) -> AppResult<Vec<EquipmentSummary>> {
        let rows = sqlx::query_as::<_, EquipmentSummary>(
            r#"
            SELECT 'camera' AS kind, c.id, c.code, c.name, c.ip_address, c.status, c.location_id
            FROM cameras c
            WHERE NOT c.deleted AND EXISTS (
                SELECT 1 FROM failures f
                WHERE f.equipment_kind = 'camera' AND f.equipment_id = c.id
                  AND NOT f.deleted AND f.status IN ('open', 'assigned', 'in_progress')
            )
            ORDER BY c.code
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Counts of failures reported in a date range, grouped by one column
    pub async fn failures_grouped(
        &self,
        column: FailureGroup,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<(String, i64)>> {
        let sql = format!(
            r#"
            SELECT {0}::text, COUNT(*) FROM failures
            WHERE NOT deleted AND reported_at::date BETWEEN $1 AND $2
            GROUP BY {0}
            ORDER BY COUNT(*) DESC, {0}
            "#,
            column.as_column()
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn failures_per_day(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT reported_at::date AS date, COUNT(*) AS count
            FROM failures
            WHERE NOT deleted AND reported_at::date BETWEEN $1 AND $2
            GROUP BY reported_at::date
            ORDER BY date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mean hours from report to repair completion
    pub async fn mean_resolution_hours(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Option<f64>> {
        let hours: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(EXTRACT(EPOCH FROM (repair_finished_at - reported_at)) / 3600.0)::float8
            FROM failures
            WHERE NOT deleted AND repair_finished_at IS NOT NULL
              AND reported_at::date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(hours.map(|h| (h * 10.0).round() / 10.0))
    }

    pub async fn top_failing_equipment(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<TopEquipment>> {
        let rows = sqlx::query_as::<_, TopEquipment>(
            r#"
            SELECT f.equipment_kind, f.equipment_id, eq.code, eq.name, COUNT(*) AS failures
            FROM failures f
            LEFT JOIN all_equipment eq ON eq.kind = f.equipment_kind AND eq.id = f.equipment_id
            WHERE NOT f.deleted AND f.reported_at::date BETWEEN $1 AND $2
            GROUP BY f.equipment_kind, f.equipment_id, eq.code, eq.name
            ORDER BY failures DESC, eq.code
            LIMIT $3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cameras joined with their location for the map, filtered
    pub async fn map_cameras(&self, query: &MapCameraQuery) -> AppResult<Vec<MapCameraRow>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT c.id, c.code, c.name, c.ip_address, c.status, c.camera_type,
                   c.latitude, c.longitude, c.location_id,
                   l.name AS location_name, l.campus, l.building, l.floor,
                   l.latitude AS location_latitude, l.longitude AS location_longitude,
                   (SELECT COUNT(*) FROM failures f
                    WHERE f.equipment_kind = 'camera' AND f.equipment_id = c.id
                      AND NOT f.deleted AND f.status IN ('open', 'assigned', 'in_progress')) AS open_failures
            FROM cameras c
            LEFT JOIN locations l ON l.id = c.location_id AND NOT l.deleted
            WHERE NOT c.deleted
            "#,
        );
        if let Some(ref building) = query.building {
            qb.push(" AND l.building ILIKE ").push_bind(building.trim().to_string());
        }
        if let Some(status) = query.status {
            qb.push(" AND c.status = ").push_bind(status);
        }
        if let Some(camera_type) = query.camera_type {
            qb.push(" AND c.camera_type = ").push_bind(camera_type);
        }
        qb.push(" ORDER BY c.code");

        let rows = qb.build_query_as::<MapCameraRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Georeferenced locations with their camera counts
    pub async fn map_locations(&self) -> AppResult<Vec<MapLocation>> {
        let rows = sqlx::query_as::<_, MapLocation>(
            r#"
            SELECT l.id, l.name, l.campus, l.building, l.latitude, l.longitude,
                   (SELECT COUNT(*) FROM cameras c WHERE c.location_id = l.id AND NOT c.deleted) AS cameras
            FROM locations l
            WHERE NOT l.deleted AND l.latitude IS NOT NULL AND l.longitude IS NOT NULL
            ORDER BY l.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Camera totals for the map header: (total, active, inactive, maintenance, georeferenced)
    pub async fn map_camera_totals(&self) -> AppResult<(i64, i64, i64, i64, i64)> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE c.status = 'active'),
                COUNT(*) FILTER (WHERE c.status NOT IN ('active', 'maintenance')),
                COUNT(*) FILTER (WHERE c.status = 'maintenance'),
                COUNT(*) FILTER (WHERE (c.latitude IS NOT NULL AND c.longitude IS NOT NULL)
                                    OR (l.latitude IS NOT NULL AND l.longitude IS NOT NULL))
            FROM cameras c
            LEFT JOIN locations l ON l.id = c.location_id AND NOT l.deleted
            WHERE NOT c.deleted
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn cameras_per_building(&self) -> AppResult<Vec<BuildingStats>> {
        let rows = sqlx::query_as::<_, BuildingStats>(
            r#"
            SELECT l.building,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE c.status = 'active') AS active,
                   COUNT(*) FILTER (WHERE c.status != 'active') AS inactive
            FROM cameras c
            JOIN locations l ON l.id = c.location_id
            WHERE NOT c.deleted AND l.building IS NOT NULL AND l.building != ''
            GROUP BY l.building
            ORDER BY l.building
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Columns a failure report can be grouped on
#[derive(Debug, Clone, Copy)]
pub enum FailureGroup {
    Status,
    Priority,
    EquipmentKind,
}

impl FailureGroup {
    fn as_column(&self) -> &'static str {
        match self {
            FailureGroup::Status => "status",
            FailureGroup::Priority => "priority",
            FailureGroup::EquipmentKind => "equipment_kind",
        }
    }
}
