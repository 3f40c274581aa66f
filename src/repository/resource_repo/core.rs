use crate::domain::resource::{Resource, ResourceKindSummary};
use crate::domain::types::{ResourceKind, ResourceStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, now_ts, parse_enum, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub(super) const RESOURCE_COLUMNS: &str = "resource_kind, resource_id, name, status, \
    assigned_center_id, assigned_batch_id, created_at, updated_at";

// ==========================================
// ResourceRepository
// ==========================================
pub struct ResourceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ResourceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Onboard a resource
    ///
    /// # Returns
    /// - `Err(UniqueConstraintViolation)` when kind + id already exists
    pub fn insert(&self, resource: &Resource) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO resource (
                resource_kind, resource_id, name, status,
                assigned_center_id, assigned_batch_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                resource.resource_kind.to_db_str(),
                resource.resource_id,
                resource.name,
                resource.status.to_db_str(),
                resource.assigned_center_id,
                resource.assigned_batch_id,
                format_ts(&resource.created_at),
                format_ts(&resource.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Operator status change (leave / maintenance / back to available)
    ///
    /// Assignment is owned by lock/release: an assigned resource cannot be
    /// moved here, and nothing can be moved to `assigned` here.
    pub fn set_status(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        status: ResourceStatus,
    ) -> RepositoryResult<Resource> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let current = load_resource(&tx, kind, resource_id)?
            .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;

        if current.status == ResourceStatus::Assigned || status == ResourceStatus::Assigned {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.status.to_db_str().to_string(),
                to: status.to_db_str().to_string(),
            });
        }

        tx.execute(
            "UPDATE resource SET status = ?1, updated_at = ?2 \
             WHERE resource_kind = ?3 AND resource_id = ?4 AND is_deleted = 0",
            params![
                status.to_db_str(),
                format_ts(&now_ts()),
                kind.to_db_str(),
                resource_id
            ],
        )?;

        let updated = load_resource(&tx, kind, resource_id)?
            .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(updated)
    }

    // ==========================================
    // Reads
    // ==========================================

    pub fn find(&self, kind: ResourceKind, resource_id: &str) -> RepositoryResult<Option<Resource>> {
        let conn = self.get_conn()?;
        load_resource(&conn, kind, resource_id)
    }

    /// List resources, optionally of one kind, ordered by kind then id
    pub fn list(&self, kind: Option<ResourceKind>) -> RepositoryResult<Vec<Resource>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM resource WHERE is_deleted = 0 \
             AND (?1 IS NULL OR resource_kind = ?1) ORDER BY resource_kind, resource_id",
            RESOURCE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![kind.map(|k| k.to_db_str())], map_resource_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Counts per status for every kind (kinds with no resources report zeros)
    pub fn summary(&self) -> RepositoryResult<BTreeMap<ResourceKind, ResourceKindSummary>> {
        let conn = self.get_conn()?;
        let mut out: BTreeMap<ResourceKind, ResourceKindSummary> = ResourceKind::ALL
            .iter()
            .map(|k| (*k, ResourceKindSummary::default()))
            .collect();

        let mut stmt = conn.prepare(
            "SELECT resource_kind, status, COUNT(*) FROM resource \
             WHERE is_deleted = 0 GROUP BY resource_kind, status",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(0)?;
            let status: String = row.get(1)?;
            Ok((
                parse_enum(0, &kind, ResourceKind::from_db_str)?,
                parse_enum(1, &status, ResourceStatus::from_db_str)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        for row in rows {
            let (kind, status, count) = row?;
            let entry = out.entry(kind).or_default();
            entry.total += count;
            match status {
                ResourceStatus::Available => entry.available += count,
                ResourceStatus::Assigned => entry.assigned += count,
                ResourceStatus::OnLeave => entry.on_leave += count,
                ResourceStatus::Maintenance => entry.maintenance += count,
            }
        }
        Ok(out)
    }
}

pub(super) fn resource_key(kind: ResourceKind, resource_id: &str) -> String {
    format!("{}/{}", kind.to_db_str(), resource_id)
}

pub(super) fn map_resource_row(row: &rusqlite::Row) -> rusqlite::Result<Resource> {
    let kind: String = row.get(0)?;
    let status: String = row.get(3)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Resource {
        resource_kind: parse_enum(0, &kind, ResourceKind::from_db_str)?,
        resource_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_enum(3, &status, ResourceStatus::from_db_str)?,
        assigned_center_id: row.get(4)?,
        assigned_batch_id: row.get(5)?,
        created_at: parse_ts(6, &created_at)?,
        updated_at: parse_ts(7, &updated_at)?,
    })
}

/// Load one live resource on an existing connection or transaction
pub(super) fn load_resource(
    conn: &Connection,
    kind: ResourceKind,
    resource_id: &str,
) -> RepositoryResult<Option<Resource>> {
    let sql = format!(
        "SELECT {} FROM resource WHERE resource_kind = ?1 AND resource_id = ?2 AND is_deleted = 0",
        RESOURCE_COLUMNS
    );
    let resource = conn
        .query_row(&sql, params![kind.to_db_str(), resource_id], map_resource_row)
        .optional()?;
    Ok(resource)
}
