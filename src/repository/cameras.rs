//! Cameras repository

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::camera::{Camera, CreateCamera, UpdateCamera},
};

#[derive(Clone)]
pub struct CamerasRepository {
    pool: Pool<Postgres>,
}

impl CamerasRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a camera
    pub async fn create(&self, data: &CreateCamera, actor: Option<i32>) -> AppResult<Camera> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO cameras (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(
            ", cabinet_id, camera_type, resolution, switch_id, switch_port, nvr_id, nvr_channel, \
             power_supply_id, poe, warranty_until, next_maintenance_on, latitude, longitude) VALUES (",
        );
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_id);
        sep.push_bind(data.camera_type);
        sep.push_bind(data.resolution.clone());
        sep.push_bind(data.switch_id);
        sep.push_bind(data.switch_port);
        sep.push_bind(data.nvr_id);
        sep.push_bind(data.nvr_channel);
        sep.push_bind(data.power_supply_id);
        sep.push_bind(data.poe.unwrap_or(true));
        sep.push_bind(data.warranty_until);
        sep.push_bind(data.next_maintenance_on);
        sep.push_bind(data.latitude);
        sep.push_bind(data.longitude);
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    /// Update a camera
    pub async fn update(
        &self,
        id: i32,
        data: &UpdateCamera,
        actor: Option<i32>,
    ) -> AppResult<Camera> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE cameras SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_id", data.cabinet_id);
        set_if_some!(sep, "camera_type", data.camera_type);
        set_if_some!(sep, "resolution", data.resolution.clone());
        set_if_some!(sep, "switch_id", data.switch_id);
        set_if_some!(sep, "switch_port", data.switch_port);
        set_if_some!(sep, "nvr_id", data.nvr_id);
        set_if_some!(sep, "nvr_channel", data.nvr_channel);
        set_if_some!(sep, "power_supply_id", data.power_supply_id);
        set_if_some!(sep, "poe", data.poe);
        set_if_some!(sep, "warranty_until", data.warranty_until);
        set_if_some!(sep, "last_maintenance_on", data.last_maintenance_on);
        set_if_some!(sep, "next_maintenance_on", data.next_maintenance_on);
        set_if_some!(sep, "latitude", data.latitude);
        set_if_some!(sep, "longitude", data.longitude);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }

    /// Cameras whose next preventive maintenance is due
    pub async fn maintenance_due(&self, on_or_before: NaiveDate) -> AppResult<Vec<Camera>> {
        let rows = sqlx::query_as::<_, Camera>(
            r#"
            SELECT * FROM cameras
            WHERE NOT deleted AND status != 'decommissioned'
              AND next_maintenance_on IS NOT NULL AND next_maintenance_on <= $1
            ORDER BY next_maintenance_on, code
            "#,
        )
        .bind(on_or_before)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cameras plugged into a switch
    pub async fn by_switch(&self, switch_id: i32) -> AppResult<Vec<Camera>> {
        let rows = sqlx::query_as::<_, Camera>(
            "SELECT * FROM cameras WHERE switch_id = $1 AND NOT deleted ORDER BY switch_port, code",
        )
        .bind(switch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Record a completed maintenance on a camera
    pub async fn set_maintenance_dates(
        conn: &mut PgConnection,
        id: i32,
        done_on: NaiveDate,
        next: Option<NaiveDate>,
    ) -> AppResult<()> {
        let current: Option<Option<NaiveDate>> = sqlx::query_scalar(
            "SELECT next_maintenance_on FROM cameras WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        let Some(current) = current else {
            return Ok(());
        };

        sqlx::query(
            r#"
            UPDATE cameras
            SET last_maintenance_on = $2,
                next_maintenance_on = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(done_on)
        .bind(next_maintenance_after(done_on, current, next))
        .execute(conn)
        .await?;
        Ok(())
    }
}

/// Next due date once a maintenance is done on `done_on`: an explicit date wins,
/// and a stored date the work already covers is cleared
pub fn next_maintenance_after(
    done_on: NaiveDate,
    current: Option<NaiveDate>,
    requested: Option<NaiveDate>,
) -> Option<NaiveDate> {
    requested.or(current.filter(|due| *due > done_on))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_overdue_date_is_cleared() {
        assert_eq!(next_maintenance_after(day(10), Some(day(1)), None), None);
        assert_eq!(next_maintenance_after(day(10), Some(day(10)), None), None);
    }

    #[test]
    fn test_future_date_is_kept() {
        assert_eq!(next_maintenance_after(day(10), Some(day(20)), None), Some(day(20)));
        assert_eq!(next_maintenance_after(day(10), None, None), None);
    }

    #[test]
    fn test_requested_date_wins() {
        assert_eq!(
            next_maintenance_after(day(10), Some(day(1)), Some(day(30))),
            Some(day(30))
        );
    }
}
