//! Network links repository

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LinkType,
        network_link::{CreateNetworkLink, NetworkLink, NetworkLinkQuery},
    },
};

#[derive(Clone)]
pub struct NetworkLinksRepository {
    pool: Pool<Postgres>,
}

impl NetworkLinksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Links touching a device (either end), or every link
    pub async fn list(&self, query: &NetworkLinkQuery) -> AppResult<Vec<NetworkLink>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM network_links WHERE TRUE");
        match (query.kind, query.id) {
            (Some(kind), Some(id)) => {
                qb.push(" AND ((source_kind = ")
                    .push_bind(kind)
                    .push(" AND source_id = ")
                    .push_bind(id)
                    .push(") OR (target_kind = ")
                    .push_bind(kind)
                    .push(" AND target_id = ")
                    .push_bind(id)
                    .push("))");
            }
            (Some(kind), None) => {
                qb.push(" AND (source_kind = ")
                    .push_bind(kind)
                    .push(" OR target_kind = ")
                    .push_bind(kind)
                    .push(")");
            }
            _ => {}
        }
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<NetworkLink>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn active(&self) -> AppResult<Vec<NetworkLink>> {
        let rows = sqlx::query_as::<_, NetworkLink>("SELECT * FROM network_links WHERE active")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, data: &CreateNetworkLink) -> AppResult<NetworkLink> {
        let row = sqlx::query_as::<_, NetworkLink>(
            r#"
            INSERT INTO network_links (
                source_kind, source_id, target_kind, target_id, link_type,
                source_port, target_port, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.source_kind)
        .bind(data.source_id)
        .bind(data.target_kind)
        .bind(data.target_id)
        .bind(data.link_type.unwrap_or(LinkType::Ethernet))
        .bind(&data.source_port)
        .bind(&data.target_port)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_active(&self, id: i32, active: bool) -> AppResult<NetworkLink> {
        sqlx::query_as::<_, NetworkLink>(
            "UPDATE network_links SET active = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Network link {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM network_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Network link {} not found", id)));
        }
        Ok(())
    }
}
