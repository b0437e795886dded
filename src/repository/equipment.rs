//! Queries shared by every equipment table

use sqlx::{
    postgres::PgRow, query_builder::Separated, FromRow, PgConnection, Pool, Postgres,
    QueryBuilder,
};

use super::{like_pattern, page_bounds};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentKind, EquipmentStatus},
        equipment::{
            EquipmentFields, EquipmentPatch, EquipmentQuery, EquipmentSummary, HasCore,
            StatusHistoryEntry,
        },
    },
};

/// Columns filled from `EquipmentFields` on insert, in bind order
pub const CORE_INSERT_COLUMNS: &str =
    "code, name, brand, model, serial_number, ip_address, mac_address, status, location_id, installed_on, notes";

pub fn push_core_values(sep: &mut Separated<'_, '_, Postgres, &'static str>, f: &EquipmentFields) {
    sep.push_bind(f.code.clone());
    sep.push_bind(f.name.clone());
    sep.push_bind(f.brand.clone());
    sep.push_bind(f.model.clone());
    sep.push_bind(f.serial_number.clone());
    sep.push_bind(f.ip_address.clone());
    sep.push_bind(f.mac_address.clone());
    sep.push_bind(f.status.unwrap_or(EquipmentStatus::Active));
    sep.push_bind(f.location_id);
    sep.push_bind(f.installed_on);
    sep.push_bind(f.notes.clone());
}

pub fn push_core_patch(sep: &mut Separated<'_, '_, Postgres, &'static str>, p: &EquipmentPatch) {
    set_if_some!(sep, "code", p.code.clone());
    set_if_some!(sep, "name", p.name.clone());
    set_if_some!(sep, "brand", p.brand.clone());
    set_if_some!(sep, "model", p.model.clone());
    set_if_some!(sep, "serial_number", p.serial_number.clone());
    set_if_some!(sep, "ip_address", p.ip_address.clone());
    set_if_some!(sep, "mac_address", p.mac_address.clone());
    set_if_some!(sep, "status", p.status);
    set_if_some!(sep, "location_id", p.location_id);
    set_if_some!(sep, "installed_on", p.installed_on);
    set_if_some!(sep, "decommissioned_on", p.decommissioned_on);
    set_if_some!(sep, "notes", p.notes.clone());
}

/// Run a built INSERT and its "created" history entry in one transaction
pub async fn insert_tracked<T>(
    pool: &Pool<Postgres>,
    mut qb: QueryBuilder<'_, Postgres>,
    actor: Option<i32>,
) -> AppResult<T>
where
    T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut tx = pool.begin().await?;
    let row = qb.build_query_as::<T>().fetch_one(&mut *tx).await?;
    let core = row.core();
    EquipmentRepository::record_history_with(
        &mut tx,
        T::KIND,
        core.id,
        None,
        core.status,
        Some("created"),
        actor,
    )
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// Run a built UPDATE of row `id`; a status change lands in the history in the
/// same transaction
pub async fn update_tracked<T>(
    pool: &Pool<Postgres>,
    id: i32,
    mut qb: QueryBuilder<'_, Postgres>,
    actor: Option<i32>,
) -> AppResult<T>
where
    T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let not_found = || AppError::NotFound(format!("{} {} not found", T::KIND.label(), id));
    let select = format!(
        "SELECT status FROM {} WHERE id = $1 AND NOT deleted FOR UPDATE",
        T::KIND.table()
    );

    let mut tx = pool.begin().await?;
    let old: EquipmentStatus = sqlx::query_scalar(&select)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;
    let row = qb
        .build_query_as::<T>()
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;
    let new = row.core().status;
    if new != old {
        EquipmentRepository::record_history_with(&mut tx, T::KIND, id, Some(old), new, None, actor)
            .await?;
    }
    tx.commit().await?;
    Ok(row)
}

fn summary_select(kind: EquipmentKind) -> String {
    format!(
        "SELECT '{}' AS kind, id, code, name, ip_address, status, location_id FROM {} WHERE NOT deleted",
        kind.as_str(),
        kind.table()
    )
}

/// One upstream -> downstream dependency taken from the foreign keys or network links
#[derive(Debug, Clone, FromRow)]
pub struct DependencyRow {
    pub upstream_kind: EquipmentKind,
    pub upstream_id: i32,
    pub downstream_kind: EquipmentKind,
    pub downstream_id: i32,
    /// `power`, `network` or `recording`
    pub link: String,
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a non-deleted row by ID
    pub async fn get<T>(&self, id: i32) -> AppResult<T>
    where
        T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND NOT deleted", T::KIND.table());
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::KIND.label(), id)))
    }

    /// Get a non-deleted row by its code
    pub async fn get_by_code<T>(&self, code: &str) -> AppResult<Option<T>>
    where
        T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE UPPER(code) = UPPER($1) AND NOT deleted",
            T::KIND.table()
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// List rows with filters and pagination
    pub async fn list<T>(&self, query: &EquipmentQuery) -> AppResult<(Vec<T>, i64)>
    where
        T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let (_, per_page, offset) = page_bounds(query.page, query.per_page);
        let table = T::KIND.table();

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", table));
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", table));
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY code LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &EquipmentQuery) {
        qb.push(" WHERE NOT deleted");
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(location_id) = query.location_id {
            qb.push(" AND location_id = ").push_bind(location_id);
        }
        if let Some(pattern) = like_pattern(query.q.as_deref()) {
            qb.push(" AND (code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR ip_address ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Check that a non-deleted row exists
    pub async fn exists(&self, kind: EquipmentKind, id: i32) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND NOT deleted)",
            kind.table()
        );
        let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    /// Check if a code is already used by another non-deleted row of the same kind
    pub async fn code_exists(
        &self,
        kind: EquipmentKind,
        code: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE UPPER(code) = UPPER($1) AND NOT deleted AND id != $2)",
            kind.table()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(code)
            .bind(exclude_id.unwrap_or(0))
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn summary(&self, kind: EquipmentKind, id: i32) -> AppResult<EquipmentSummary> {
        let sql = format!("{} AND id = $1", summary_select(kind));
        sqlx::query_as::<_, EquipmentSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind.label(), id)))
    }

    /// Search code, name and IP across every equipment kind
    pub async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<EquipmentSummary>> {
        let Some(pattern) = like_pattern(Some(term)) else {
            return Ok(Vec::new());
        };
        let unions: Vec<String> = EquipmentKind::ALL
            .iter()
            .map(|k| {
                format!(
                    "{} AND (code ILIKE $1 OR name ILIKE $1 OR ip_address ILIKE $1)",
                    summary_select(*k)
                )
            })
            .collect();
        let sql = format!("{} ORDER BY name LIMIT $2", unions.join(" UNION ALL "));

        let rows = sqlx::query_as::<_, EquipmentSummary>(&sql)
            .bind(pattern)
            .bind(limit.clamp(1, 200))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Row of one kind whose code, or failing that name, equals `text` ignoring case
    pub async fn find_exact(&self, kind: EquipmentKind, text: &str) -> AppResult<Option<i32>> {
        let sql = format!(
            r#"
            SELECT id FROM {}
            WHERE NOT deleted AND (UPPER(code) = UPPER($1) OR LOWER(name) = LOWER($1))
            ORDER BY (UPPER(code) = UPPER($1)) DESC, id
            LIMIT 1
            "#,
            kind.table()
        );
        let id = sqlx::query_scalar::<_, i32>(&sql)
            .bind(text.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// Find every row using an exact IP address
    pub async fn find_by_ip(&self, ip: &str) -> AppResult<Vec<EquipmentSummary>> {
        let unions: Vec<String> = EquipmentKind::ALL
            .iter()
            .map(|k| format!("{} AND ip_address = $1", summary_select(*k)))
            .collect();
        let rows = sqlx::query_as::<_, EquipmentSummary>(&unions.join(" UNION ALL "))
            .bind(ip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rows other than `exclude` already using this IP
    pub async fn ip_in_use(
        &self,
        ip: &str,
        exclude: Option<(EquipmentKind, i32)>,
    ) -> AppResult<Option<EquipmentSummary>> {
        let found = self.find_by_ip(ip).await?;
        Ok(found
            .into_iter()
            .find(|s| exclude.map(|(k, id)| !(s.kind == k && s.id == id)).unwrap_or(true)))
    }

    /// Equipment mounted in a cabinet
    pub async fn in_cabinet(&self, cabinet_id: i32) -> AppResult<Vec<EquipmentSummary>> {
        let unions: Vec<String> = EquipmentKind::ALL
            .iter()
            .filter(|k| **k != EquipmentKind::Cabinet)
            .map(|k| format!("{} AND cabinet_id = $1", summary_select(*k)))
            .collect();
        let sql = format!("{} ORDER BY kind, code", unions.join(" UNION ALL "));
        let rows = sqlx::query_as::<_, EquipmentSummary>(&sql)
            .bind(cabinet_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Equipment at a location, every kind
    pub async fn at_location(&self, location_id: i32) -> AppResult<Vec<EquipmentSummary>> {
        let unions: Vec<String> = EquipmentKind::ALL
            .iter()
            .map(|k| format!("{} AND location_id = $1", summary_select(*k)))
            .collect();
        let sql = format!("{} ORDER BY kind, code", unions.join(" UNION ALL "));
        let rows = sqlx::query_as::<_, EquipmentSummary>(&sql)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Change status and append to the history, returns the previous status
    pub async fn change_status(
        &self,
        kind: EquipmentKind,
        id: i32,
        status: EquipmentStatus,
        reason: Option<&str>,
        changed_by: Option<i32>,
    ) -> AppResult<EquipmentStatus> {
        let mut tx = self.pool.begin().await?;
        let old = Self::change_status_with(&mut tx, kind, id, status, reason, changed_by).await?;
        tx.commit().await?;
        Ok(old)
    }

    /// Current status of a live row, read inside a transaction
    pub async fn status_with(
        conn: &mut PgConnection,
        kind: EquipmentKind,
        id: i32,
    ) -> AppResult<Option<EquipmentStatus>> {
        let sql = format!("SELECT status FROM {} WHERE id = $1 AND NOT deleted", kind.table());
        let status: Option<EquipmentStatus> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(status)
    }

    /// Same as `change_status` on an existing connection or transaction
    pub async fn change_status_with(
        conn: &mut PgConnection,
        kind: EquipmentKind,
        id: i32,
        status: EquipmentStatus,
        reason: Option<&str>,
        changed_by: Option<i32>,
    ) -> AppResult<EquipmentStatus> {
        let select = format!(
            "SELECT status FROM {} WHERE id = $1 AND NOT deleted FOR UPDATE",
            kind.table()
        );
        let old: EquipmentStatus = sqlx::query_scalar(&select)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind.label(), id)))?;

        if old == status {
            return Ok(old);
        }

        let update = format!(
            "UPDATE {} SET status = $1, updated_at = NOW() WHERE id = $2",
            kind.table()
        );
        sqlx::query(&update)
            .bind(status)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Self::record_history_with(conn, kind, id, Some(old), status, reason, changed_by).await?;
        Ok(old)
    }

    pub async fn record_history(
        &self,
        kind: EquipmentKind,
        id: i32,
        old: Option<EquipmentStatus>,
        new: EquipmentStatus,
        reason: Option<&str>,
        changed_by: Option<i32>,
    ) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::record_history_with(&mut conn, kind, id, old, new, reason, changed_by).await
    }

    pub async fn record_history_with(
        conn: &mut PgConnection,
        kind: EquipmentKind,
        id: i32,
        old: Option<EquipmentStatus>,
        new: EquipmentStatus,
        reason: Option<&str>,
        changed_by: Option<i32>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment_status_history
                (equipment_kind, equipment_id, old_status, new_status, reason, changed_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(kind)
        .bind(id)
        .bind(old)
        .bind(new)
        .bind(reason)
        .bind(changed_by)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Status history, newest first
    pub async fn history(&self, kind: EquipmentKind, id: i32) -> AppResult<Vec<StatusHistoryEntry>> {
        let rows = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            SELECT * FROM equipment_status_history
            WHERE equipment_kind = $1 AND equipment_id = $2
            ORDER BY changed_at DESC, id DESC
            "#,
        )
        .bind(kind)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Soft delete: the row is hidden and marked decommissioned
    pub async fn soft_delete(&self, kind: EquipmentKind, id: i32) -> AppResult<()> {
        let sql = format!(
            r#"
            UPDATE {} SET deleted = TRUE, status = 'decommissioned',
                decommissioned_on = COALESCE(decommissioned_on, CURRENT_DATE), updated_at = NOW()
            WHERE id = $1 AND NOT deleted
            "#,
            kind.table()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", kind.label(), id)));
        }
        Ok(())
    }

    /// Row counts per status for one kind
    pub async fn status_counts(&self, kind: EquipmentKind) -> AppResult<Vec<(EquipmentStatus, i64)>> {
        let sql = format!(
            "SELECT status, COUNT(*) FROM {} WHERE NOT deleted GROUP BY status",
            kind.table()
        );
        let rows: Vec<(EquipmentStatus, i64)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Every non-deleted row of every kind, through the `all_equipment` view
    pub async fn all_summaries(&self) -> AppResult<Vec<EquipmentSummary>> {
        let rows = sqlx::query_as::<_, EquipmentSummary>(
            "SELECT kind, id, code, name, ip_address, status, location_id FROM all_equipment WHERE NOT deleted",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Power, network and recording dependencies between live devices
    pub async fn dependencies(&self) -> AppResult<Vec<DependencyRow>> {
        let rows = sqlx::query_as::<_, DependencyRow>(
            r#"
            SELECT 'ups' AS upstream_kind, ups_id AS upstream_id,
                   'power_supply' AS downstream_kind, id AS downstream_id, 'power' AS link
            FROM power_supplies WHERE ups_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'ups', ups_id, 'switch', id, 'power'
            FROM switches WHERE ups_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'power_supply', power_supply_id, 'switch', id, 'power'
            FROM switches WHERE power_supply_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'ups', ups_id, 'nvr', id, 'power'
            FROM nvrs WHERE ups_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'switch', switch_id, 'nvr', id, 'network'
            FROM nvrs WHERE switch_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'power_supply', power_supply_id, 'camera', id, 'power'
            FROM cameras WHERE power_supply_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'switch', switch_id, 'camera', id, 'network'
            FROM cameras WHERE switch_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT 'nvr', nvr_id, 'camera', id, 'recording'
            FROM cameras WHERE nvr_id IS NOT NULL AND NOT deleted
            UNION ALL
            SELECT source_kind, source_id, target_kind, target_id, 'network'
            FROM network_links WHERE active
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
