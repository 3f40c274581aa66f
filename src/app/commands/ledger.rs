use crate::app::state::AppState;
use serde::Deserialize;
use std::sync::Arc;

use super::common::run_blocking;
use super::contract::ContractIdArgs;

// ==========================================
// Allocation ledger commands
// ==========================================

#[derive(Debug, Deserialize)]
pub struct ValidateAllocationArgs {
    pub contract_id: String,
    pub job_role_id: String,
    pub requested_students: i64,
    #[serde(default)]
    pub exclude_batch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAllocationArgs {
    pub contract_id: String,
    pub job_role_id: String,
    pub center_id: String,
    pub batch_id: String,
    pub students: i64,
    pub actor: String,
}

#[derive(Debug, Deserialize)]
pub struct ResizeBatchArgs {
    pub batch_id: String,
    pub new_students: i64,
    pub actor: String,
}

/// Ledger of one contract
pub async fn get_target_ledger(state: Arc<AppState>, args: ContractIdArgs) -> Result<String, String> {
    run_blocking(&state, move |s| s.ledger_api.get_ledger(&args.contract_id)).await
}

/// Ledgers of every active contract
pub async fn list_ledgers(state: Arc<AppState>) -> Result<String, String> {
    run_blocking(&state, |s| s.ledger_api.list_active_ledgers()).await
}

/// Quota check without writes; over-allocation comes back as an error
pub async fn validate_allocation(
    state: Arc<AppState>,
    args: ValidateAllocationArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.ledger_api.validate_allocation(
            &args.contract_id,
            &args.job_role_id,
            args.requested_students,
            args.exclude_batch_id.as_deref(),
        )
    })
    .await
}

pub async fn record_allocation(
    state: Arc<AppState>,
    args: RecordAllocationArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.ledger_api.record_allocation(
            &args.contract_id,
            &args.job_role_id,
            &args.center_id,
            &args.batch_id,
            args.students,
            &args.actor,
        )
    })
    .await
}

pub async fn list_allocation_entries(
    state: Arc<AppState>,
    args: ContractIdArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.ledger_api.list_allocation_entries(&args.contract_id)
    })
    .await
}

pub async fn resize_batch(state: Arc<AppState>, args: ResizeBatchArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.ledger_api
            .resize_batch(&args.batch_id, args.new_students, &args.actor)
    })
    .await
}
