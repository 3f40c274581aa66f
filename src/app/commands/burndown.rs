use crate::app::state::AppState;
use serde::Deserialize;
use std::sync::Arc;

use super::common::run_blocking;
use super::contract::ContractIdArgs;

// ==========================================
// Burn-down commands
// ==========================================

#[derive(Debug, Default, Deserialize)]
pub struct BurndownArgs {
    #[serde(default)]
    pub contract_id: Option<String>,
}

/// Report over one or all contracts
pub async fn get_burndown(state: Arc<AppState>, args: BurndownArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.burndown_api.get_burndown(args.contract_id.as_deref())
    })
    .await
}

pub async fn get_contract_burndown(
    state: Arc<AppState>,
    args: ContractIdArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.burndown_api.get_contract_burndown(&args.contract_id)
    })
    .await
}
