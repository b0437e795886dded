//! Cabinets repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::cabinet::{Cabinet, CreateCabinet, UpdateCabinet},
};

#[derive(Clone)]
pub struct CabinetsRepository {
    pool: Pool<Postgres>,
}

impl CabinetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateCabinet, actor: Option<i32>) -> AppResult<Cabinet> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO cabinets (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(", cabinet_type, rack_units, material, ip_rating) VALUES (");
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_type);
        sep.push_bind(data.rack_units);
        sep.push_bind(data.material.clone());
        sep.push_bind(data.ip_rating.clone());
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    pub async fn update(
        &self,
        id: i32,
        data: &UpdateCabinet,
        actor: Option<i32>,
    ) -> AppResult<Cabinet> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE cabinets SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_type", data.cabinet_type);
        set_if_some!(sep, "rack_units", data.rack_units);
        set_if_some!(sep, "material", data.material.clone());
        set_if_some!(sep, "ip_rating", data.ip_rating.clone());
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }
}
