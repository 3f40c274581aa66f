// ==========================================
// SkillFlow Ledger - contract repository
// ==========================================
// Tables: contract, contract_job_role, contract_district
// Completion cascade also touches batch / resource / booking in one transaction
// ==========================================

use crate::domain::contract::{Contract, DistrictAllocation, JobRoleQuota};
use crate::domain::types::{ContractStatus, ResourceKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::resource_repo::release_in_tx;
use crate::repository::row_codec::{format_ts, now_ts, parse_enum, parse_opt_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const CONTRACT_COLUMNS: &str = "contract_id, work_order_number, awarding_body, scheme_name, \
    status, created_by, created_at, completed_by, completed_at";

/// Result of closing a contract
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractCompletion {
    pub contract_id: String,
    pub already_completed: bool,
    pub trainers_released: usize,
    pub managers_released: usize,
    pub infrastructure_released: usize,
    pub bookings_closed: usize,
    pub batches_completed: usize,
}

// ==========================================
// ContractRepository
// ==========================================
pub struct ContractRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContractRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Insert a contract with its job roles and districts
    pub fn insert(&self, contract: &Contract) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO contract (
                contract_id, work_order_number, awarding_body, scheme_name,
                status, created_by, created_at, completed_by, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                contract.contract_id,
                contract.work_order_number,
                contract.awarding_body,
                contract.scheme_name,
                contract.status.to_db_str(),
                contract.created_by,
                format_ts(&contract.created_at),
                contract.completed_by,
                contract.completed_at.as_ref().map(format_ts),
            ],
        )?;

        for (seq, role) in contract.job_roles.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO contract_job_role (
                    contract_id, job_role_id, job_role_code, job_role_name, target_students, seq_no
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    contract.contract_id,
                    role.job_role_id,
                    role.job_role_code,
                    role.job_role_name,
                    role.target_students,
                    seq as i64,
                ],
            )?;
        }

        for (seq, district) in contract.districts.iter().enumerate() {
            insert_district(&tx, &contract.contract_id, district, seq as i64)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Append a district to an existing contract
    pub fn add_district(
        &self,
        contract_id: &str,
        district: &DistrictAllocation,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let next_seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq_no) + 1, 0) FROM contract_district WHERE contract_id = ?1",
            params![contract_id],
            |row| row.get(0),
        )?;
        insert_district(&conn, contract_id, district, next_seq)
    }

    /// Close a contract and release everything bound to its batches
    ///
    /// One IMMEDIATE transaction covers the whole cascade: either every
    /// resource is released and the contract is completed, or nothing changes.
    /// A contract that is already completed is reported as such, without writes.
    pub fn complete_with_release(
        &self,
        contract_id: &str,
        actor: &str,
    ) -> RepositoryResult<ContractCompletion> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM contract WHERE contract_id = ?1 AND is_deleted = 0",
                params![contract_id],
                |row| row.get(0),
            )
            .optional()?;
        let status = match status {
            Some(s) => s,
            None => return Err(RepositoryError::not_found("Contract", contract_id)),
        };

        let mut completion = ContractCompletion {
            contract_id: contract_id.to_string(),
            ..Default::default()
        };
        if ContractStatus::from_db_str(&status) == Some(ContractStatus::Completed) {
            completion.already_completed = true;
            return Ok(completion);
        }

        let bound: Vec<(String, String)> = {
            let mut stmt = tx.prepare(
                r#"
                SELECT resource_kind, resource_id FROM resource
                WHERE assigned_batch_id IN (SELECT batch_id FROM batch WHERE contract_id = ?1)
                UNION
                SELECT resource_kind, resource_id FROM booking
                WHERE status = 'active'
                  AND batch_id IN (SELECT batch_id FROM batch WHERE contract_id = ?1)
                ORDER BY 1, 2
                "#,
            )?;
            let rows = stmt
                .query_map(params![contract_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let now = now_ts();
        for (kind_raw, resource_id) in &bound {
            let kind = parse_enum(0, kind_raw, ResourceKind::from_db_str)?;
            let released = release_in_tx(&tx, kind, resource_id, actor, &now)?;
            completion.bookings_closed += released.closed_bookings;
            if released.was_assigned || released.closed_bookings > 0 {
                match kind {
                    ResourceKind::Trainer => completion.trainers_released += 1,
                    ResourceKind::Manager => completion.managers_released += 1,
                    ResourceKind::Infrastructure => completion.infrastructure_released += 1,
                }
            }
        }

        let now_str = format_ts(&now);
        completion.batches_completed = tx.execute(
            "UPDATE batch SET status = 'completed', updated_at = ?1 \
             WHERE contract_id = ?2 AND is_deleted = 0 AND status = 'active'",
            params![now_str, contract_id],
        )?;

        tx.execute(
            "UPDATE contract SET status = 'completed', completed_by = ?1, completed_at = ?2 \
             WHERE contract_id = ?3",
            params![actor, now_str, contract_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(completion)
    }

    // ==========================================
    // Reads
    // ==========================================

    /// Load a live contract with its job roles and districts
    pub fn find_by_id(&self, contract_id: &str) -> RepositoryResult<Option<Contract>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM contract WHERE contract_id = ?1 AND is_deleted = 0",
            CONTRACT_COLUMNS
        );
        let header = conn
            .query_row(&sql, params![contract_id], map_contract_row)
            .optional()?;

        match header {
            Some(contract) => Ok(Some(load_children(&conn, contract)?)),
            None => Ok(None),
        }
    }

    /// List live contracts, optionally filtered by status, oldest first
    pub fn list(&self, status: Option<ContractStatus>) -> RepositoryResult<Vec<Contract>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM contract WHERE is_deleted = 0 AND (?1 IS NULL OR status = ?1) \
             ORDER BY created_at, work_order_number",
            CONTRACT_COLUMNS
        );
        let headers = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![status.map(|s| s.to_db_str())], map_contract_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        headers
            .into_iter()
            .map(|c| load_children(&conn, c))
            .collect()
    }
}

fn insert_district(
    conn: &Connection,
    contract_id: &str,
    district: &DistrictAllocation,
    seq_no: i64,
) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO contract_district (contract_id, district_name, planned_center_count, seq_no)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            contract_id,
            district.district_name,
            district.planned_center_count,
            seq_no
        ],
    )?;
    Ok(())
}

fn map_contract_row(row: &rusqlite::Row) -> rusqlite::Result<Contract> {
    let status: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(Contract {
        contract_id: row.get(0)?,
        work_order_number: row.get(1)?,
        awarding_body: row.get(2)?,
        scheme_name: row.get(3)?,
        job_roles: Vec::new(),
        districts: Vec::new(),
        status: parse_enum(4, &status, ContractStatus::from_db_str)?,
        created_by: row.get(5)?,
        created_at: parse_ts(6, &created_at)?,
        completed_by: row.get(7)?,
        completed_at: parse_opt_ts(8, row.get(8)?)?,
    })
}

fn load_children(conn: &Connection, mut contract: Contract) -> RepositoryResult<Contract> {
    let mut stmt = conn.prepare(
        "SELECT job_role_id, job_role_code, job_role_name, target_students \
         FROM contract_job_role WHERE contract_id = ?1 ORDER BY seq_no",
    )?;
    contract.job_roles = stmt
        .query_map(params![contract.contract_id], |row| {
            Ok(JobRoleQuota {
                job_role_id: row.get(0)?,
                job_role_code: row.get(1)?,
                job_role_name: row.get(2)?,
                target_students: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT district_name, planned_center_count \
         FROM contract_district WHERE contract_id = ?1 ORDER BY seq_no",
    )?;
    contract.districts = stmt
        .query_map(params![contract.contract_id], |row| {
            Ok(DistrictAllocation {
                district_name: row.get(0)?,
                planned_center_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contract)
}
