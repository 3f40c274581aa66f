// ==========================================
// SkillFlow Ledger - burn-down API
// ==========================================
// Read-only: contract targets + batch allocations + stage progress
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineSettings;
use crate::domain::burndown::{BurndownReport, ContractBurndown};
use crate::domain::contract::Contract;
use crate::engine::burndown::BurndownAggregator;
use crate::repository::{BatchRepository, ContractRepository, StageProgressRepository};
use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::debug;

pub struct BurndownApi {
    contract_repo: Arc<ContractRepository>,
    batch_repo: Arc<BatchRepository>,
    stage_repo: Arc<StageProgressRepository>,
    aggregator: BurndownAggregator,
}

impl BurndownApi {
    pub fn new(
        contract_repo: Arc<ContractRepository>,
        batch_repo: Arc<BatchRepository>,
        stage_repo: Arc<StageProgressRepository>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            contract_repo,
            batch_repo,
            stage_repo,
            aggregator: BurndownAggregator::with_percent_decimals(settings.percent_decimals),
        }
    }

    /// Burn-down report over one contract or every live contract
    ///
    /// # Arguments
    /// - `contract_id`: None = all contracts (active and completed)
    ///
    /// # Returns
    /// - `Err(NotFound)`: the given contract does not exist
    pub fn get_burndown(&self, contract_id: Option<&str>) -> ApiResult<BurndownReport> {
        let contracts = match contract_id {
            Some(id) => vec![self.load_contract(id)?],
            None => self.contract_repo.list(None)?,
        };

        let generated_at = Utc::now().naive_utc();
        let burndowns = contracts
            .iter()
            .map(|contract| self.burndown_of(contract, generated_at))
            .collect::<ApiResult<Vec<_>>>()?;

        debug!(contracts = burndowns.len(), "burn-down report built");
        Ok(self.aggregator.report(burndowns, generated_at))
    }

    /// Burn-down of a single contract
    pub fn get_contract_burndown(&self, contract_id: &str) -> ApiResult<ContractBurndown> {
        let contract = self.load_contract(contract_id)?;
        self.burndown_of(&contract, Utc::now().naive_utc())
    }

    fn load_contract(&self, contract_id: &str) -> ApiResult<Contract> {
        self.contract_repo
            .find_by_id(contract_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract(id={})", contract_id)))
    }

    fn burndown_of(
        &self,
        contract: &Contract,
        generated_at: NaiveDateTime,
    ) -> ApiResult<ContractBurndown> {
        let batches = self.batch_repo.list_by_contract(&contract.contract_id)?;
        let progress = self.stage_repo.list_by_contract(&contract.contract_id)?;
        Ok(self
            .aggregator
            .contract_burndown(contract, &batches, &progress, generated_at))
    }
}
