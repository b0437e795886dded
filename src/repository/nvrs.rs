//! NVR/DVR repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::equipment::{
    insert_tracked, push_core_patch, push_core_values, update_tracked, CORE_INSERT_COLUMNS,
};
use crate::{
    error::AppResult,
    models::{
        enums::RecorderType,
        nvr::{CreateNvr, Nvr, UpdateNvr},
    },
};

#[derive(Clone)]
pub struct NvrsRepository {
    pool: Pool<Postgres>,
}

impl NvrsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateNvr, actor: Option<i32>) -> AppResult<Nvr> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO nvrs (");
        qb.push(CORE_INSERT_COLUMNS);
        qb.push(", cabinet_id, system_type, channels, storage_capacity_gb, switch_id, ups_id) VALUES (");
        let mut sep = qb.separated(", ");
        push_core_values(&mut sep, &data.common);
        sep.push_bind(data.cabinet_id);
        sep.push_bind(data.system_type.unwrap_or(RecorderType::Nvr));
        sep.push_bind(data.channels);
        sep.push_bind(data.storage_capacity_gb);
        sep.push_bind(data.switch_id);
        sep.push_bind(data.ups_id);
        sep.push_unseparated(") RETURNING *");

        insert_tracked(&self.pool, qb, actor).await
    }

    pub async fn update(&self, id: i32, data: &UpdateNvr, actor: Option<i32>) -> AppResult<Nvr> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE nvrs SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        push_core_patch(&mut sep, &data.common);
        set_if_some!(sep, "cabinet_id", data.cabinet_id);
        set_if_some!(sep, "system_type", data.system_type);
        set_if_some!(sep, "channels", data.channels);
        set_if_some!(sep, "storage_capacity_gb", data.storage_capacity_gb);
        set_if_some!(sep, "switch_id", data.switch_id);
        set_if_some!(sep, "ups_id", data.ups_id);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        update_tracked(&self.pool, id, qb, actor).await
    }

    /// Channels already taken on a recorder
    pub async fn used_channels(&self, nvr_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cameras WHERE nvr_id = $1 AND NOT deleted",
        )
        .bind(nvr_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
