//! Switches repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::switch::{CreateSwitch, Switch, UpdateSwitch},
};

#[derive(Clone)]
pub struct SwitchesRepository {
    pool: Pool<Postgres>,
}

impl SwitchesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateSwitch, actor: Option<i32>) -> AppResult<Switch> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO switches (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(
            ", cabinet_id, total_ports, poe_ports, poe_budget_watts, managed, power_supply_id, ups_id) VALUES (",
        );
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_id);
        sep.push_bind(data.total_ports);
        sep.push_bind(data.poe_ports);
        sep.push_bind(data.poe_budget_watts);
        sep.push_bind(data.managed.unwrap_or(false));
        sep.push_bind(data.power_supply_id);
        sep.push_bind(data.ups_id);
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    pub async fn update(
        &self,
        id: i32,
        data: &UpdateSwitch,
        actor: Option<i32>,
    ) -> AppResult<Switch> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE switches SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_id", data.cabinet_id);
        set_if_some!(sep, "total_ports", data.total_ports);
        set_if_some!(sep, "poe_ports", data.poe_ports);
        set_if_some!(sep, "poe_budget_watts", data.poe_budget_watts);
        set_if_some!(sep, "managed", data.managed);
        set_if_some!(sep, "power_supply_id", data.power_supply_id);
        set_if_some!(sep, "ups_id", data.ups_id);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }
}
