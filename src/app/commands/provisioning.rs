use crate::api::provisioning_api::OpenCenterRequest;
use crate::app::state::AppState;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{parse_date_range, run_blocking};

// ==========================================
// Provisioning commands
// ==========================================

#[derive(Debug, Deserialize)]
pub struct OpenCenterArgs {
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
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub actor: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteContractArgs {
    pub contract_id: String,
    pub actor: String,
}

/// Lock a center's resources and allocate its seats
pub async fn open_center(state: Arc<AppState>, args: OpenCenterArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let request = OpenCenterRequest {
            date_range: parse_date_range(args.start_date.as_deref(), args.end_date.as_deref())?,
            contract_id: args.contract_id,
            job_role_id: args.job_role_id,
            center_id: args.center_id,
            students: args.students,
            trainer_id: args.trainer_id,
            manager_id: args.manager_id,
            infra_id: args.infra_id,
            actor: args.actor,
        };
        s.provisioning_api.open_center(&request)
    })
    .await
}

/// Close a contract and release its resources
pub async fn complete_contract(
    state: Arc<AppState>,
    args: CompleteContractArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        s.provisioning_api
            .complete_contract(&args.contract_id, &args.actor)
    })
    .await
}
