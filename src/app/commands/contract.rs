use crate::app::state::AppState;
use crate::domain::contract::{DistrictAllocation, JobRoleQuota, NewContract};
use serde::Deserialize;
use std::sync::Arc;

use super::common::run_blocking;

// ==========================================
// Contract commands
// ==========================================

#[derive(Debug, Deserialize)]
pub struct CreateContractArgs {
    pub work_order_number: String,
    #[serde(default)]
    pub awarding_body: Option<String>,
    #[serde(default)]
    pub scheme_name: Option<String>,
    pub job_roles: Vec<JobRoleQuota>,
    #[serde(default)]
    pub districts: Vec<DistrictAllocation>,
    pub actor: String,
}

#[derive(Debug, Deserialize)]
pub struct ContractIdArgs {
    pub contract_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListContractsArgs {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddDistrictArgs {
    pub contract_id: String,
    pub district_name: String,
    #[serde(default)]
    pub planned_center_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecordStageProgressArgs {
    pub batch_id: String,
    pub stage: String,
    pub completed: i64,
}

/// Register a master work order
pub async fn create_contract(state: Arc<AppState>, args: CreateContractArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let input = NewContract {
            work_order_number: args.work_order_number,
            awarding_body: args.awarding_body,
            scheme_name: args.scheme_name,
            job_roles: args.job_roles,
            districts: args.districts,
        };
        s.contract_api.create_contract(input, &args.actor)
    })
    .await
}

pub async fn get_contract(state: Arc<AppState>, args: ContractIdArgs) -> Result<String, String> {
    run_blocking(&state, move |s| s.contract_api.get_contract(&args.contract_id)).await
}

pub async fn list_contracts(state: Arc<AppState>, args: ListContractsArgs) -> Result<String, String> {
    run_blocking(&state, move |s| s.contract_api.list_contracts(args.status.as_deref())).await
}

pub async fn add_district(state: Arc<AppState>, args: AddDistrictArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.contract_api
            .add_district(&args.contract_id, &args.district_name, args.planned_center_count)
    })
    .await
}

/// Live batches of a contract
pub async fn list_batches(state: Arc<AppState>, args: ContractIdArgs) -> Result<String, String> {
    run_blocking(&state, move |s| s.contract_api.list_batches(&args.contract_id)).await
}

/// Upsert the cumulative completed count of one stage for one batch
pub async fn record_stage_progress(
    state: Arc<AppState>,
    args: RecordStageProgressArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.contract_api
            .record_stage_progress(&args.batch_id, &args.stage, args.completed)
    })
    .await
}
