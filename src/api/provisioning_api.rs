// ==========================================
// SkillFlow Ledger - center provisioning workflow
// ==========================================
// OpenCenter:
//   contract active -> quota pre-check -> availability pre-check
//   -> lock infrastructure, manager, trainer -> batch + ledger entry (atomic)
//   Any failure after the first lock releases the locks taken in this call.
// CompleteContract:
//   one transaction releases every resource bound to the contract's batches
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::ledger_api::{new_batch_id, require_non_empty, require_non_negative, LedgerApi};
use crate::api::resource_api::{conflict, LockReceipt, ResourceApi};
use crate::config::EngineSettings;
use crate::domain::batch::{AllocationEntry, Batch, NewBatch};
use crate::domain::ledger::AllocationDecision;
use crate::domain::resource::{Availability, DateRange, LockRequest};
use crate::domain::types::ResourceKind;
use crate::repository::{ContractCompletion, ContractRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Request to open a training center for one job role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenCenterRequest {
    pub contract_id: String,
    pub job_role_id: String,
    pub center_id: String,
    pub students: i64,
    #[serde(default)]
    pub trainer_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub infra_id: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    pub actor: String,
}

impl OpenCenterRequest {
    /// Requested resources in lock order: infrastructure, manager, trainer
    fn resources_in_lock_order(&self) -> Vec<(ResourceKind, &str)> {
        [
            (ResourceKind::Infrastructure, self.infra_id.as_deref()),
            (ResourceKind::Manager, self.manager_id.as_deref()),
            (ResourceKind::Trainer, self.trainer_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.map(|id| (kind, id)))
        .collect()
    }
}

/// A provisioned center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenCenterResult {
    pub batch: Batch,
    pub entry: AllocationEntry,
    pub decision: AllocationDecision,
    pub locked_resources: Vec<LockReceipt>,
}

// ==========================================
// ProvisioningApi
// ==========================================
pub struct ProvisioningApi {
    contract_repo: Arc<ContractRepository>,
    ledger_api: Arc<LedgerApi>,
    resource_api: Arc<ResourceApi>,
    require_date_range: bool,
}

impl ProvisioningApi {
    pub fn new(
        contract_repo: Arc<ContractRepository>,
        ledger_api: Arc<LedgerApi>,
        resource_api: Arc<ResourceApi>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            contract_repo,
            ledger_api,
            resource_api,
            require_date_range: settings.require_date_range,
        }
    }

    /// Open a center: lock its resources and allocate its seats
    ///
    /// # Returns
    /// - `Err(InvalidStateTransition)`: contract completed
    /// - `Err(OverAllocation)`: seats exceed the remaining quota
    /// - `Err(ResourceConflict)`: a requested resource is held elsewhere
    /// - `Err(NotFound)`: unknown contract, job role or resource
    #[instrument(skip(self, request), fields(
        contract_id = %request.contract_id,
        job_role_id = %request.job_role_id,
        center_id = %request.center_id
    ))]
    pub fn open_center(&self, request: &OpenCenterRequest) -> ApiResult<OpenCenterResult> {
        // ===== input =====
        require_non_empty("center_id", &request.center_id)?;
        require_non_empty("actor", &request.actor)?;
        require_non_negative("students", request.students)?;
        let resources = request.resources_in_lock_order();
        if self.require_date_range && !resources.is_empty() && request.date_range.is_none() {
            return Err(ApiError::InvalidInput(
                "date_range is required when locking resources".to_string(),
            ));
        }

        // ===== 1. contract must be active =====
        let contract = self
            .contract_repo
            .find_by_id(&request.contract_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract(id={})", request.contract_id)))?;
        if !contract.is_active() {
            return Err(ApiError::InvalidStateTransition {
                from: contract.status.to_string(),
                to: "open_center".to_string(),
            });
        }

        // ===== 2. quota pre-check =====
        self.ledger_api.validate_allocation(
            &request.contract_id,
            &request.job_role_id,
            request.students,
            None,
        )?;

        // ===== 3. availability pre-check =====
        for (kind, resource_id) in &resources {
            let availability = self.resource_api.check_availability(
                *kind,
                resource_id,
                request.date_range.as_ref(),
                None,
            )?;
            if let Availability::NotAvailable { .. } = availability {
                warn!(resource_kind = %kind, resource_id, "resource unavailable, center not opened");
                return Err(conflict(*kind, resource_id, availability));
            }
        }

        // ===== 4. lock =====
        let batch_id = new_batch_id();
        let mut locked: Vec<LockReceipt> = Vec::with_capacity(resources.len());
        for (kind, resource_id) in &resources {
            let lock_request = LockRequest {
                resource_kind: *kind,
                resource_id: resource_id.to_string(),
                center_id: request.center_id.clone(),
                batch_id: Some(batch_id.clone()),
                date_range: request.date_range,
                actor: request.actor.clone(),
            };
            match self.resource_api.lock_resource(&lock_request) {
                Ok(receipt) => locked.push(receipt),
                Err(err) => {
                    self.rollback_locks(&locked, &request.actor);
                    return Err(err);
                }
            }
        }

        // ===== 5. batch + ledger entry =====
        let new_batch = NewBatch {
            batch_id,
            contract_id: request.contract_id.clone(),
            job_role_id: request.job_role_id.clone(),
            center_id: request.center_id.clone(),
            allocated_students: request.students,
        };
        let receipt = match self.ledger_api.commit_new_batch(&new_batch, &request.actor) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.rollback_locks(&locked, &request.actor);
                return Err(err);
            }
        };

        info!(
            batch_id = %receipt.batch.batch_id,
            students = receipt.batch.allocated_students,
            locked = locked.len(),
            "center opened"
        );
        Ok(OpenCenterResult {
            batch: receipt.batch,
            entry: receipt.entry,
            decision: receipt.decision,
            locked_resources: locked,
        })
    }

    /// Close a contract and free every resource bound to it
    #[instrument(skip(self))]
    pub fn complete_contract(&self, contract_id: &str, actor: &str) -> ApiResult<ContractCompletion> {
        require_non_empty("actor", actor)?;
        let completion = self.contract_repo.complete_with_release(contract_id, actor)?;

        if completion.already_completed {
            info!("contract already completed, nothing to release");
        } else {
            info!(
                trainers = completion.trainers_released,
                managers = completion.managers_released,
                infrastructure = completion.infrastructure_released,
                bookings = completion.bookings_closed,
                batches = completion.batches_completed,
                "contract completed"
            );
        }
        Ok(completion)
    }

    /// Release locks taken by a failed open_center, newest first
    ///
    /// Only the bookings this call created are undone; a resource that has
    /// since been released and locked by another center keeps its holder.
    /// Release failures are logged; the caller returns the failing step's error.
    fn rollback_locks(&self, locked: &[LockReceipt], actor: &str) {
        for receipt in locked.iter().rev() {
            let kind = receipt.resource.resource_kind;
            let resource_id = receipt.resource.resource_id.as_str();
            match self.resource_api.release_lock(receipt, actor) {
                Ok(Some(_)) => warn!(resource_kind = %kind, resource_id, "lock rolled back"),
                Ok(None) => {}
                Err(e) => error!(resource_kind = %kind, resource_id, error = %e, "lock rollback failed"),
            }
        }
    }
}
