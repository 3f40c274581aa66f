// ==========================================
// SkillFlow Ledger - allocation repository
// ==========================================
// Tables: allocation_entry (append-only), batch, contract_job_role
// The allocated count is always SUM(batch.allocated_students); there is no
// stored counter to drift.
// Quota-checked writes run read-sum / decide / insert inside one IMMEDIATE
// transaction, so concurrent writers for the same job role serialize.
// ==========================================

use crate::domain::batch::{AllocationEntry, Batch, NewBatch};
use crate::domain::ledger::{AllocationCommit, AllocationDecision, JobRoleUsage};
use crate::domain::types::{BatchStatus, ContractStatus, EntryStatus};
use crate::repository::batch_repo::{insert_batch, load_batch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, now_ts, parse_enum, parse_ts};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const ENTRY_COLUMNS: &str = "entry_id, contract_id, job_role_id, center_id, batch_id, \
    allocated_students, status, allocated_by, allocated_at";

pub struct AllocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Reads
    // ==========================================

    /// Target and current allocation of one job role
    ///
    /// # Arguments
    /// - `exclude_batch_id`: batch whose own seats are left out of the sum
    ///
    /// # Returns
    /// - `Err(NotFound)`: contract or job role missing
    pub fn load_usage(
        &self,
        contract_id: &str,
        job_role_id: &str,
        exclude_batch_id: Option<&str>,
    ) -> RepositoryResult<JobRoleUsage> {
        let conn = self.get_conn()?;
        usage_in_tx(&conn, contract_id, job_role_id, exclude_batch_id)
    }

    /// Ledger entries of a contract, oldest first
    pub fn list_entries(&self, contract_id: &str) -> RepositoryResult<Vec<AllocationEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM allocation_entry WHERE contract_id = ?1 \
             ORDER BY allocated_at, rowid",
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![contract_id], map_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Append a ledger entry without any quota check
    ///
    /// The batch must already exist. Callers that need the quota guarantee
    /// use `commit_new_batch` instead.
    pub fn record(&self, entry: &AllocationEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_entry(&conn, entry)
    }

    /// Create a batch and its ledger entry under the job role's quota
    ///
    /// `decide` receives the usage read inside the transaction and the
    /// requested seats; a rejected decision rolls everything back.
    pub fn commit_new_batch<F>(
        &self,
        new_batch: &NewBatch,
        actor: &str,
        decide: F,
    ) -> RepositoryResult<AllocationCommit>
    where
        F: FnOnce(&JobRoleUsage, i64) -> AllocationDecision,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        ensure_contract_active(&tx, &new_batch.contract_id)?;
        let usage = usage_in_tx(&tx, &new_batch.contract_id, &new_batch.job_role_id, None)?;
        let decision = decide(&usage, new_batch.allocated_students);
        if !decision.approved {
            return Ok(AllocationCommit::Rejected(decision));
        }

        let now = now_ts();
        let batch = Batch {
            batch_id: new_batch.batch_id.clone(),
            contract_id: new_batch.contract_id.clone(),
            job_role_id: new_batch.job_role_id.clone(),
            center_id: new_batch.center_id.clone(),
            allocated_students: new_batch.allocated_students,
            status: BatchStatus::Active,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        };
        insert_batch(&tx, &batch)?;

        let entry = new_entry(&batch, actor, now);
        insert_entry(&tx, &entry)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(AllocationCommit::Committed {
            batch,
            entry,
            decision,
        })
    }

    /// Resize a batch in place under the job role's quota
    ///
    /// The batch's own seats are excluded from the sum before `decide` runs.
    /// Earlier entries of the batch become `superseded` and a fresh active
    /// entry records the new size.
    pub fn resize_batch<F>(
        &self,
        batch_id: &str,
        new_students: i64,
        actor: &str,
        decide: F,
    ) -> RepositoryResult<AllocationCommit>
    where
        F: FnOnce(&JobRoleUsage, i64) -> AllocationDecision,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let batch = load_batch(&tx, batch_id)?
            .ok_or_else(|| RepositoryError::not_found("Batch", batch_id))?;
        if batch.status != BatchStatus::Active {
            return Err(RepositoryError::InvalidStateTransition {
                from: batch.status.to_db_str().to_string(),
                to: "resized".to_string(),
            });
        }
        ensure_contract_active(&tx, &batch.contract_id)?;

        let usage = usage_in_tx(&tx, &batch.contract_id, &batch.job_role_id, Some(batch_id))?;
        let decision = decide(&usage, new_students);
        if !decision.approved {
            return Ok(AllocationCommit::Rejected(decision));
        }

        let now = now_ts();
        tx.execute(
            "UPDATE batch SET allocated_students = ?1, updated_at = ?2 WHERE batch_id = ?3",
            params![new_students, format_ts(&now), batch_id],
        )?;
        tx.execute(
            "UPDATE allocation_entry SET status = 'superseded' \
             WHERE batch_id = ?1 AND status = 'active'",
            params![batch_id],
        )?;

        let batch = load_batch(&tx, batch_id)?
            .ok_or_else(|| RepositoryError::not_found("Batch", batch_id))?;
        let entry = new_entry(&batch, actor, now);
        insert_entry(&tx, &entry)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(AllocationCommit::Committed {
            batch,
            entry,
            decision,
        })
    }
}

fn new_entry(batch: &Batch, actor: &str, at: NaiveDateTime) -> AllocationEntry {
    AllocationEntry {
        entry_id: Uuid::new_v4().to_string(),
        contract_id: batch.contract_id.clone(),
        job_role_id: batch.job_role_id.clone(),
        center_id: batch.center_id.clone(),
        batch_id: batch.batch_id.clone(),
        allocated_students: batch.allocated_students,
        status: EntryStatus::Active,
        allocated_by: actor.to_string(),
        allocated_at: at,
    }
}

fn insert_entry(conn: &Connection, entry: &AllocationEntry) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO allocation_entry (
            entry_id, contract_id, job_role_id, center_id, batch_id,
            allocated_students, status, allocated_by, allocated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            entry.entry_id,
            entry.contract_id,
            entry.job_role_id,
            entry.center_id,
            entry.batch_id,
            entry.allocated_students,
            entry.status.to_db_str(),
            entry.allocated_by,
            format_ts(&entry.allocated_at),
        ],
    )?;
    Ok(())
}

fn ensure_contract_active(conn: &Connection, contract_id: &str) -> RepositoryResult<()> {
    let status: Option<String> = conn
        .query_row(
            "SELECT status FROM contract WHERE contract_id = ?1 AND is_deleted = 0",
            params![contract_id],
            |row| row.get(0),
        )
        .optional()?;

    match status.as_deref().and_then(ContractStatus::from_db_str) {
        Some(ContractStatus::Active) => Ok(()),
        Some(other) => Err(RepositoryError::InvalidStateTransition {
            from: other.to_db_str().to_string(),
            to: "allocated".to_string(),
        }),
        None => Err(RepositoryError::not_found("Contract", contract_id)),
    }
}

fn usage_in_tx(
    conn: &Connection,
    contract_id: &str,
    job_role_id: &str,
    exclude_batch_id: Option<&str>,
) -> RepositoryResult<JobRoleUsage> {
    let role: Option<(String, i64)> = conn
        .query_row(
            r#"
            SELECT jr.job_role_name, jr.target_students
            FROM contract_job_role jr
            JOIN contract c ON c.contract_id = jr.contract_id
            WHERE jr.contract_id = ?1 AND jr.job_role_id = ?2 AND c.is_deleted = 0
            "#,
            params![contract_id, job_role_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (job_role_name, total_target) = match role {
        Some(r) => r,
        None => {
            let contract_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM contract WHERE contract_id = ?1 AND is_deleted = 0",
                    params![contract_id],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            return Err(if contract_exists {
                RepositoryError::not_found("JobRole", format!("{}/{}", contract_id, job_role_id))
            } else {
                RepositoryError::not_found("Contract", contract_id)
            });
        }
    };

    let currently_allocated: i64 = conn.query_row(
        r#"
        SELECT COALESCE(SUM(allocated_students), 0) FROM batch
        WHERE contract_id = ?1 AND job_role_id = ?2 AND is_deleted = 0
          AND (?3 IS NULL OR batch_id <> ?3)
        "#,
        params![contract_id, job_role_id, exclude_batch_id],
        |row| row.get(0),
    )?;

    Ok(JobRoleUsage {
        contract_id: contract_id.to_string(),
        job_role_id: job_role_id.to_string(),
        job_role_name,
        total_target,
        currently_allocated,
    })
}

fn map_entry_row(row: &rusqlite::Row) -> rusqlite::Result<AllocationEntry> {
    let status: String = row.get(6)?;
    let allocated_at: String = row.get(8)?;
    Ok(AllocationEntry {
        entry_id: row.get(0)?,
        contract_id: row.get(1)?,
        job_role_id: row.get(2)?,
        center_id: row.get(3)?,
        batch_id: row.get(4)?,
        allocated_students: row.get(5)?,
        status: parse_enum(6, &status, EntryStatus::from_db_str)?,
        allocated_by: row.get(7)?,
        allocated_at: parse_ts(8, &allocated_at)?,
    })
}
