// ==========================================
// SkillFlow Ledger - batch repository
// ==========================================
// Table: batch (soft-deleted rows are ignored everywhere)
// Batch creation under a quota goes through AllocationRepository
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::types::BatchStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, parse_enum, parse_ts};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub(crate) const BATCH_COLUMNS: &str = "batch_id, contract_id, job_role_id, center_id, \
    allocated_students, status, created_by, created_at, updated_at";

pub struct BatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        load_batch(&conn, batch_id)
    }

    /// Live batches of a contract, oldest first
    pub fn list_by_contract(&self, contract_id: &str) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM batch WHERE contract_id = ?1 AND is_deleted = 0 \
             ORDER BY created_at, rowid",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![contract_id], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

pub(crate) fn insert_batch(conn: &Connection, batch: &Batch) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO batch (
            batch_id, contract_id, job_role_id, center_id, allocated_students,
            status, created_by, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            batch.batch_id,
            batch.contract_id,
            batch.job_role_id,
            batch.center_id,
            batch.allocated_students,
            batch.status.to_db_str(),
            batch.created_by,
            format_ts(&batch.created_at),
            format_ts(&batch.updated_at),
        ],
    )?;
    Ok(())
}

pub(crate) fn load_batch(conn: &Connection, batch_id: &str) -> RepositoryResult<Option<Batch>> {
    let sql = format!(
        "SELECT {} FROM batch WHERE batch_id = ?1 AND is_deleted = 0",
        BATCH_COLUMNS
    );
    let batch = conn
        .query_row(&sql, params![batch_id], map_batch_row)
        .optional()?;
    Ok(batch)
}

pub(crate) fn map_batch_row(row: &rusqlite::Row) -> rusqlite::Result<Batch> {
    let status: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(Batch {
        batch_id: row.get(0)?,
        contract_id: row.get(1)?,
        job_role_id: row.get(2)?,
        center_id: row.get(3)?,
        allocated_students: row.get(4)?,
        status: parse_enum(5, &status, BatchStatus::from_db_str)?,
        created_by: row.get(6)?,
        created_at: parse_ts(7, &created_at)?,
        updated_at: parse_ts(8, &updated_at)?,
    })
}
