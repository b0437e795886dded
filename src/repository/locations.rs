//! Locations repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::{like_pattern, page_bounds};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LocationKind,
        location::{CreateLocation, Location, LocationEquipment, LocationQuery, UpdateLocation},
    },
};

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List locations with optional filters and pagination
    pub async fn list(&self, query: &LocationQuery) -> AppResult<(Vec<Location>, i64)> {
        let (_, per_page, offset) = page_bounds(query.page, query.per_page);

        let mut conditions = vec!["NOT deleted".to_string()];
        let mut idx = 1;

        if query.kind.is_some() {
            conditions.push(format!("kind = ${}", idx));
            idx += 1;
        }
        if query.campus.is_some() {
            conditions.push(format!("campus ILIKE ${}", idx));
            idx += 1;
        }
        if query.building.is_some() {
            conditions.push(format!("building ILIKE ${}", idx));
            idx += 1;
        }
        let pattern = like_pattern(query.q.as_deref());
        if pattern.is_some() {
            conditions.push(format!("(name ILIKE ${0} OR code ILIKE ${0} OR description ILIKE ${0})", idx));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_q = format!("SELECT COUNT(*) FROM locations {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(kind) = query.kind { count_builder = count_builder.bind(kind); }
        if let Some(ref campus) = query.campus { count_builder = count_builder.bind(campus); }
        if let Some(ref building) = query.building { count_builder = count_builder.bind(building); }
        if let Some(ref p) = pattern { count_builder = count_builder.bind(p); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM locations {} ORDER BY campus NULLS LAST, building NULLS LAST, name LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Location>(&select_q);
        if let Some(kind) = query.kind { builder = builder.bind(kind); }
        if let Some(ref campus) = query.campus { builder = builder.bind(campus); }
        if let Some(ref building) = query.building { builder = builder.bind(building); }
        if let Some(ref p) = pattern { builder = builder.bind(p); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get location by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Location> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1 AND NOT deleted")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1 AND NOT deleted)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE UPPER(code) = UPPER($1) AND NOT deleted AND id != $2)",
        )
        .bind(code)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Find a location by code, then by exact (case-insensitive) name
    pub async fn find_by_code_or_name(
        &self,
        code: Option<&str>,
        name: &str,
    ) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, Location>(
            r#"
            SELECT * FROM locations
            WHERE NOT deleted
              AND (($1::text IS NOT NULL AND UPPER(code) = UPPER($1)) OR LOWER(name) = LOWER($2))
            ORDER BY (UPPER(code) = UPPER($1)) DESC NULLS LAST, id
            LIMIT 1
            "#,
        )
        .bind(code)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create a location
    pub async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        let row = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                code, name, kind, parent_id, campus, building, floor,
                latitude, longitude, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.kind.unwrap_or(LocationKind::Building))
        .bind(data.parent_id)
        .bind(&data.campus)
        .bind(&data.building)
        .bind(&data.floor)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a location
    pub async fn update(&self, id: i32, data: &UpdateLocation) -> AppResult<Location> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE locations SET ");
        let mut sep = qb.separated(", ");
        sep.push("updated_at = NOW()");
        set_if_some!(sep, "code", data.code.clone());
        set_if_some!(sep, "name", data.name.clone());
        set_if_some!(sep, "kind", data.kind);
        set_if_some!(sep, "parent_id", data.parent_id);
        set_if_some!(sep, "campus", data.campus.clone());
        set_if_some!(sep, "building", data.building.clone());
        set_if_some!(sep, "floor", data.floor.clone());
        set_if_some!(sep, "latitude", data.latitude);
        set_if_some!(sep, "longitude", data.longitude);
        set_if_some!(sep, "description", data.description.clone());
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT deleted RETURNING *");

        qb.build_query_as::<Location>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    /// Soft delete a location; children are detached
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE locations SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT deleted",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {} not found", id)));
        }
        sqlx::query("UPDATE locations SET parent_id = NULL WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Direct children of a location
    pub async fn children(&self, id: i32) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE parent_id = $1 AND NOT deleted ORDER BY name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Equipment counts per kind at a location
    pub async fn equipment_counts(&self, id: i32) -> AppResult<LocationEquipment> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cameras WHERE location_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM switches WHERE location_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM nvrs WHERE location_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM ups_units WHERE location_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM power_supplies WHERE location_id = $1 AND NOT deleted),
                (SELECT COUNT(*) FROM cabinets WHERE location_id = $1 AND NOT deleted)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(LocationEquipment {
            location_id: id,
            cameras: row.0,
            switches: row.1,
            nvrs: row.2,
            ups_units: row.3,
            power_supplies: row.4,
            cabinets: row.5,
        })
    }

    /// Distinct building names, used by map filters
    pub async fn buildings(&self) -> AppResult<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT building FROM locations
            WHERE NOT deleted AND building IS NOT NULL AND building != ''
            ORDER BY building
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
