// ==========================================
// SkillFlow Ledger - ledger views and allocation decisions
// ==========================================
// All values here are recomputed from batch rows on every read; nothing is cached
// ==========================================

use crate::domain::batch::{AllocationEntry, Batch};
use crate::domain::types::{BatchStatus, ContractStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One center's share of a job role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterAllocation {
    pub center_id: String,
    pub batch_id: String,
    pub allocated_students: i64,
    pub status: BatchStatus,
}

/// Ledger line for one job role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRoleLedger {
    pub job_role_id: String,
    pub job_role_code: String,
    pub job_role_name: String,
    pub total_target: i64,
    pub allocated: i64,
    pub remaining: i64,
    pub utilization_percent: f64,
    pub is_fully_allocated: bool,
    /// allocated > target in stored data; surfaced, never rejected retroactively
    pub is_over_allocated: bool,
    pub center_allocations: Vec<CenterAllocation>,
}

/// Ledger for a whole contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractLedger {
    pub contract_id: String,
    pub work_order_number: String,
    pub status: ContractStatus,
    pub job_roles: Vec<JobRoleLedger>,

    // ===== contract totals (sum over job roles) =====
    pub total_target: i64,
    pub total_allocated: i64,
    pub total_remaining: i64,
    pub utilization_percent: f64,

    // ===== centers =====
    pub centers_planned: i64,
    pub centers_opened: i64,

    pub generated_at: NaiveDateTime,
}

/// Allocation state of one (contract, job role) pair, as read for validation
///
/// `currently_allocated` already excludes the batch being resized, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRoleUsage {
    pub contract_id: String,
    pub job_role_id: String,
    pub job_role_name: String,
    pub total_target: i64,
    pub currently_allocated: i64,
}

/// Outcome of checking a request against the remaining quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub approved: bool,
    pub contract_id: String,
    pub job_role_id: String,
    pub job_role_name: String,
    pub requested: i64,
    pub total_target: i64,
    pub currently_allocated: i64,
    pub remaining: i64,
    /// Seats left after this request; None when rejected
    pub remaining_after: Option<i64>,
    pub message: String,
}

/// Result of an atomic batch + ledger entry write
#[derive(Debug, Clone)]
pub enum AllocationCommit {
    Committed {
        batch: Batch,
        entry: AllocationEntry,
        decision: AllocationDecision,
    },
    Rejected(AllocationDecision),
}
