//! UPS repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::ups::{CreateUps, UpdateUps, Ups},
};

#[derive(Clone)]
pub struct UpsRepository {
    pool: Pool<Postgres>,
}

impl UpsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateUps, actor: Option<i32>) -> AppResult<Ups> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ups_units (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(
            ", cabinet_id, capacity_va, capacity_watts, battery_count, runtime_minutes, last_battery_test_on) VALUES (",
        );
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_id);
        sep.push_bind(data.capacity_va);
        sep.push_bind(data.capacity_watts);
        sep.push_bind(data.battery_count);
        sep.push_bind(data.runtime_minutes);
        sep.push_bind(data.last_battery_test_on);
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    pub async fn update(&self, id: i32, data: &UpdateUps, actor: Option<i32>) -> AppResult<Ups> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ups_units SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_id", data.cabinet_id);
        set_if_some!(sep, "capacity_va", data.capacity_va);
        set_if_some!(sep, "capacity_watts", data.capacity_watts);
        set_if_some!(sep, "battery_count", data.battery_count);
        set_if_some!(sep, "runtime_minutes", data.runtime_minutes);
        set_if_some!(sep, "last_battery_test_on", data.last_battery_test_on);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }
}
