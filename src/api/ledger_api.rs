// ==========================================
// SkillFlow Ledger - allocation ledger API
// ==========================================
// GetLedger / ValidateAllocation / RecordAllocation / ResizeBatch
// Ledgers are recomputed from batch rows on every call
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineSettings;
use crate::domain::batch::{AllocationEntry, Batch, NewBatch};
use crate::domain::ledger::{AllocationCommit, AllocationDecision, ContractLedger};
use crate::domain::types::{ContractStatus, EntryStatus};
use crate::engine::allocation_ledger::AllocationLedger;
use crate::repository::{AllocationRepository, BatchRepository, ContractRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A batch with the ledger entry and decision that admitted it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReceipt {
    pub batch: Batch,
    pub entry: AllocationEntry,
    pub decision: AllocationDecision,
}

// ==========================================
// LedgerApi
// ==========================================
pub struct LedgerApi {
    contract_repo: Arc<ContractRepository>,
    batch_repo: Arc<BatchRepository>,
    allocation_repo: Arc<AllocationRepository>,
    ledger: AllocationLedger,
}

impl LedgerApi {
    pub fn new(
        contract_repo: Arc<ContractRepository>,
        batch_repo: Arc<BatchRepository>,
        allocation_repo: Arc<AllocationRepository>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            contract_repo,
            batch_repo,
            allocation_repo,
            ledger: AllocationLedger::with_percent_decimals(settings.percent_decimals),
        }
    }

    // ==========================================
    // Reads
    // ==========================================

    /// Per job role allocation of a contract plus contract totals
    ///
    /// # Returns
    /// - `Err(NotFound)`: unknown contract
    pub fn get_ledger(&self, contract_id: &str) -> ApiResult<ContractLedger> {
        let contract = self
            .contract_repo
            .find_by_id(contract_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract(id={})", contract_id)))?;
        let batches = self.batch_repo.list_by_contract(contract_id)?;

        debug!(contract_id, batches = batches.len(), "ledger computed");
        Ok(self
            .ledger
            .contract_ledger(&contract, &batches, Utc::now().naive_utc()))
    }

    /// Ledgers of every active contract
    pub fn list_active_ledgers(&self) -> ApiResult<Vec<ContractLedger>> {
        let now = Utc::now().naive_utc();
        self.contract_repo
            .list(Some(ContractStatus::Active))?
            .into_iter()
            .map(|contract| {
                let batches = self.batch_repo.list_by_contract(&contract.contract_id)?;
                Ok(self.ledger.contract_ledger(&contract, &batches, now))
            })
            .collect()
    }

    /// Ledger entries of a contract, oldest first
    pub fn list_allocation_entries(&self, contract_id: &str) -> ApiResult<Vec<AllocationEntry>> {
        self.require_contract(contract_id)?;
        Ok(self.allocation_repo.list_entries(contract_id)?)
    }

    /// Check a request against the remaining quota without writing anything
    ///
    /// # Arguments
    /// - `exclude_batch_id`: batch being resized; its own seats are not counted
    ///
    /// # Returns
    /// - `Ok(decision)`: approved, with `remaining_after`
    /// - `Err(OverAllocation)`: requested > remaining
    /// - `Err(NotFound)`: unknown contract or job role
    pub fn validate_allocation(
        &self,
        contract_id: &str,
        job_role_id: &str,
        requested: i64,
        exclude_batch_id: Option<&str>,
    ) -> ApiResult<AllocationDecision> {
        require_non_negative("requested_students", requested)?;

        let usage = self
            .allocation_repo
            .load_usage(contract_id, job_role_id, exclude_batch_id)?;
        let decision = self.ledger.decide(&usage, requested);

        if decision.approved {
            Ok(decision)
        } else {
            warn!(
                contract_id,
                job_role_id,
                requested,
                remaining = decision.remaining,
                "allocation rejected"
            );
            Err(over_allocation(decision))
        }
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Append a ledger entry for an existing batch (no quota check)
    ///
    /// Callers validate first; the quota-safe path is `commit_new_batch`.
    pub fn record_allocation(
        &self,
        contract_id: &str,
        job_role_id: &str,
        center_id: &str,
        batch_id: &str,
        students: i64,
        actor: &str,
    ) -> ApiResult<AllocationEntry> {
        require_non_empty("contract_id", contract_id)?;
        require_non_empty("job_role_id", job_role_id)?;
        require_non_empty("center_id", center_id)?;
        require_non_empty("batch_id", batch_id)?;
        require_non_empty("actor", actor)?;
        require_non_negative("students", students)?;

        let entry = AllocationEntry {
            entry_id: Uuid::new_v4().to_string(),
            contract_id: contract_id.to_string(),
            job_role_id: job_role_id.to_string(),
            center_id: center_id.to_string(),
            batch_id: batch_id.to_string(),
            allocated_students: students,
            status: EntryStatus::Active,
            allocated_by: actor.to_string(),
            allocated_at: Utc::now().naive_utc(),
        };
        self.allocation_repo.record(&entry)?;

        info!(contract_id, job_role_id, batch_id, students, "allocation recorded");
        Ok(entry)
    }

    /// Create a batch and record its allocation in one serialized step
    ///
    /// The remaining quota is re-read inside the write transaction, so two
    /// concurrent callers can never both take the last seats.
    #[instrument(skip(self, new_batch), fields(contract_id = %new_batch.contract_id, job_role_id = %new_batch.job_role_id))]
    pub fn commit_new_batch(&self, new_batch: &NewBatch, actor: &str) -> ApiResult<AllocationReceipt> {
        require_non_empty("batch_id", &new_batch.batch_id)?;
        require_non_empty("center_id", &new_batch.center_id)?;
        require_non_empty("actor", actor)?;
        require_non_negative("allocated_students", new_batch.allocated_students)?;

        let commit = self
            .allocation_repo
            .commit_new_batch(new_batch, actor, |usage, requested| {
                self.ledger.decide(usage, requested)
            })?;
        receipt(commit)
    }

    /// Resize an existing batch under the same quota rule
    #[instrument(skip(self))]
    pub fn resize_batch(
        &self,
        batch_id: &str,
        new_students: i64,
        actor: &str,
    ) -> ApiResult<AllocationReceipt> {
        require_non_empty("actor", actor)?;
        require_non_negative("new_students", new_students)?;

        let commit = self
            .allocation_repo
            .resize_batch(batch_id, new_students, actor, |usage, requested| {
                self.ledger.decide(usage, requested)
            })?;
        receipt(commit)
    }

    fn require_contract(&self, contract_id: &str) -> ApiResult<()> {
        match self.contract_repo.find_by_id(contract_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("Contract(id={})", contract_id))),
        }
    }
}

fn receipt(commit: AllocationCommit) -> ApiResult<AllocationReceipt> {
    match commit {
        AllocationCommit::Committed {
            batch,
            entry,
            decision,
        } => {
            info!(
                batch_id = %batch.batch_id,
                center_id = %batch.center_id,
                students = batch.allocated_students,
                "allocation committed"
            );
            Ok(AllocationReceipt {
                batch,
                entry,
                decision,
            })
        }
        AllocationCommit::Rejected(decision) => {
            warn!(
                contract_id = %decision.contract_id,
                job_role_id = %decision.job_role_id,
                requested = decision.requested,
                remaining = decision.remaining,
                "allocation rejected at commit"
            );
            Err(over_allocation(decision))
        }
    }
}

fn over_allocation(decision: AllocationDecision) -> ApiError {
    ApiError::OverAllocation {
        contract_id: decision.contract_id,
        job_role_id: decision.job_role_id,
        job_role_name: decision.job_role_name,
        requested: decision.requested,
        remaining: decision.remaining,
        total_target: decision.total_target,
        currently_allocated: decision.currently_allocated,
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: i64) -> ApiResult<()> {
    if value < 0 {
        return Err(ApiError::InvalidInput(format!(
            "{} must be >= 0 (got {})",
            field, value
        )));
    }
    Ok(())
}

pub(crate) fn new_batch_id() -> String {
    format!("BATCH-{}", Uuid::new_v4().simple())
}
