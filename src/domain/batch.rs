// ==========================================
// SkillFlow Ledger - batch, ledger entries, stage progress
// ==========================================

use crate::domain::types::{BatchStatus, EntryStatus, PipelineStage};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Batch (child work order)
// ==========================================
// One job role assigned to one physical center.
// The sum of allocated_students per (contract, job role) never exceeds the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub contract_id: String,
    pub job_role_id: String,
    pub center_id: String,
    pub allocated_students: i64,
    pub status: BatchStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for opening a batch at a center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBatch {
    pub batch_id: String,
    pub contract_id: String,
    pub job_role_id: String,
    pub center_id: String,
    pub allocated_students: i64,
}

// ==========================================
// AllocationEntry - append-only ledger record
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub entry_id: String,
    pub contract_id: String,
    pub job_role_id: String,
    pub center_id: String,
    pub batch_id: String,
    pub allocated_students: i64,
    pub status: EntryStatus,
    pub allocated_by: String,
    pub allocated_at: NaiveDateTime,
}

// ==========================================
// StageProgress - completed count per batch and stage
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    pub batch_id: String,
    pub stage: PipelineStage,
    pub completed: i64,
    pub updated_at: NaiveDateTime,
}
