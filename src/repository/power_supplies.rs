//! Power supplies repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::power_supply::{CreatePowerSupply, PowerSupply, UpdatePowerSupply},
};

#[derive(Clone)]
pub struct PowerSuppliesRepository {
    pool: Pool<Postgres>,
}

impl PowerSuppliesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreatePowerSupply, actor: Option<i32>) -> AppResult<PowerSupply> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO power_supplies (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(", cabinet_id, max_output_watts, output_voltage, ups_id) VALUES (");
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_id);
        sep.push_bind(data.max_output_watts);
        sep.push_bind(data.output_voltage);
        sep.push_bind(data.ups_id);
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    pub async fn update(
        &self,
        id: i32,
        data: &UpdatePowerSupply,
        actor: Option<i32>,
    ) -> AppResult<PowerSupply> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE power_supplies SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_id", data.cabinet_id);
        set_if_some!(sep, "max_output_watts", data.max_output_watts);
        set_if_some!(sep, "output_voltage", data.output_voltage);
        set_if_some!(sep, "ups_id", data.ups_id);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }
}
