// ==========================================
// SkillFlow Ledger - contract API
// ==========================================
// Master work orders, district plan, per-batch stage progress
// Targets are fixed at creation; nothing here edits them
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::ledger_api::{require_non_empty, require_non_negative};
use crate::domain::batch::{Batch, StageProgress};
use crate::domain::contract::{Contract, DistrictAllocation, NewContract};
use crate::domain::types::{ContractStatus, PipelineStage};
use crate::repository::{BatchRepository, ContractRepository, StageProgressRepository};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct ContractApi {
    contract_repo: Arc<ContractRepository>,
    batch_repo: Arc<BatchRepository>,
    stage_repo: Arc<StageProgressRepository>,
}

impl ContractApi {
    pub fn new(
        contract_repo: Arc<ContractRepository>,
        batch_repo: Arc<BatchRepository>,
        stage_repo: Arc<StageProgressRepository>,
    ) -> Self {
        Self {
            contract_repo,
            batch_repo,
            stage_repo,
        }
    }

    // ==========================================
    // Contracts
    // ==========================================

    /// Register a master work order with its job-role targets
    ///
    /// # Returns
    /// - `Err(InvalidInput)`: empty identifiers, no job role, duplicate
    ///   job role / district, negative target or center count
    /// - `Err(BusinessRuleViolation)`: work order number already used
    #[instrument(skip(self, input), fields(work_order_number = %input.work_order_number))]
    pub fn create_contract(&self, input: NewContract, actor: &str) -> ApiResult<Contract> {
        require_non_empty("actor", actor)?;
        validate_new_contract(&input)?;

        let contract = Contract {
            contract_id: Uuid::new_v4().to_string(),
            work_order_number: input.work_order_number.trim().to_string(),
            awarding_body: input.awarding_body,
            scheme_name: input.scheme_name,
            job_roles: input.job_roles,
            districts: input.districts,
            status: ContractStatus::Active,
            created_by: actor.to_string(),
            created_at: Utc::now().naive_utc(),
            completed_by: None,
            completed_at: None,
        };
        self.contract_repo.insert(&contract)?;

        info!(
            contract_id = %contract.contract_id,
            job_roles = contract.job_roles.len(),
            total_target = contract.total_training_target(),
            "contract created"
        );
        Ok(contract)
    }

    pub fn get_contract(&self, contract_id: &str) -> ApiResult<Contract> {
        self.contract_repo
            .find_by_id(contract_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract(id={})", contract_id)))
    }

    /// List contracts, optionally by status (`active` / `completed`)
    pub fn list_contracts(&self, status: Option<&str>) -> ApiResult<Vec<Contract>> {
        let status = match status {
            Some(raw) => Some(ContractStatus::from_db_str(raw).ok_or_else(|| {
                ApiError::InvalidInput(format!("unknown contract status: {}", raw))
            })?),
            None => None,
        };
        Ok(self.contract_repo.list(status)?)
    }

    /// Add a district to the plan of an existing contract
    pub fn add_district(
        &self,
        contract_id: &str,
        district_name: &str,
        planned_center_count: i64,
    ) -> ApiResult<Contract> {
        require_non_empty("district_name", district_name)?;
        require_non_negative("planned_center_count", planned_center_count)?;

        let contract = self.get_contract(contract_id)?;
        let name = district_name.trim();
        if contract.districts.iter().any(|d| d.district_name == name) {
            return Err(ApiError::InvalidInput(format!(
                "district {} already planned for contract {}",
                name, contract_id
            )));
        }

        self.contract_repo.add_district(
            contract_id,
            &DistrictAllocation {
                district_name: name.to_string(),
                planned_center_count,
            },
        )?;
        info!(contract_id, district = name, planned_center_count, "district added");

        self.get_contract(contract_id)
    }

    // ==========================================
    // Batches / progress
    // ==========================================

    pub fn list_batches(&self, contract_id: &str) -> ApiResult<Vec<Batch>> {
        self.get_contract(contract_id)?;
        Ok(self.batch_repo.list_by_contract(contract_id)?)
    }

    /// Set the cumulative completed count of one pipeline stage for a batch
    ///
    /// Counts are cumulative per stage; the burn-down clamps any
    /// out-of-order updates instead of rejecting them here.
    pub fn record_stage_progress(
        &self,
        batch_id: &str,
        stage: &str,
        completed: i64,
    ) -> ApiResult<StageProgress> {
        require_non_negative("completed", completed)?;
        let stage = PipelineStage::from_db_str(stage).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "unknown pipeline stage: {} (expected mobilization, training, ojt, assessment or placement)",
                stage
            ))
        })?;

        if self.batch_repo.find_by_id(batch_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Batch(id={})", batch_id)));
        }

        let progress = self.stage_repo.upsert(batch_id, stage, completed)?;
        info!(batch_id, stage = %stage, completed, "stage progress recorded");
        Ok(progress)
    }
}

fn validate_new_contract(input: &NewContract) -> ApiResult<()> {
    require_non_empty("work_order_number", &input.work_order_number)?;

    if input.job_roles.is_empty() {
        return Err(ApiError::InvalidInput(
            "a contract needs at least one job role".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for role in &input.job_roles {
        require_non_empty("job_role_id", &role.job_role_id)?;
        require_non_empty("job_role_name", &role.job_role_name)?;
        require_non_negative("target_students", role.target_students)?;
        if !seen.insert(role.job_role_id.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "duplicate job role: {}",
                role.job_role_id
            )));
        }
    }

    let mut seen = HashSet::new();
    for district in &input.districts {
        require_non_empty("district_name", &district.district_name)?;
        require_non_negative("planned_center_count", district.planned_center_count)?;
        if !seen.insert(district.district_name.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "duplicate district: {}",
                district.district_name
            )));
        }
    }

    Ok(())
}
