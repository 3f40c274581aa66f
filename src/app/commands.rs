// ==========================================
// SkillFlow Ledger - JSON commands (split by domain)
// ==========================================
// One command per operation; payload and result are JSON strings.
// Errors are JSON `{code, status, message, details}`.
// ==========================================

mod burndown;
mod common;
mod contract;
mod ledger;
mod provisioning;
mod resource;

pub use burndown::*;
pub use common::ErrorResponse;
pub use contract::*;
pub use ledger::*;
pub use provisioning::*;
pub use resource::*;

use crate::api::error::ApiError;
use crate::app::state::AppState;
use common::{map_api_error, parse_args};
use std::sync::Arc;

/// Every command name accepted by `execute_command`
pub const COMMAND_NAMES: &[&str] = &[
    // contracts
    "create_contract",
    "get_contract",
    "list_contracts",
    "add_district",
    "list_batches",
    // ledger
    "get_target_ledger",
    "list_ledgers",
    "validate_allocation",
    "record_allocation",
    "list_allocation_entries",
    "resize_batch",
    // resources
    "onboard_resource",
    "set_resource_status",
    "list_resources",
    "check_resource",
    "lock_resource",
    "release_resource",
    "resource_history",
    "resource_summary",
    // burn-down
    "record_stage_progress",
    "get_burndown",
    "get_contract_burndown",
    // provisioning
    "open_center",
    "complete_contract",
];

/// Dispatch one command by name
///
/// # Arguments
/// - name: command name (see `COMMAND_NAMES`)
/// - payload: JSON object with the command arguments (`null` for none)
///
/// # Returns
/// - Ok(String): JSON result
/// - Err(String): JSON error response
pub async fn execute_command(
    state: Arc<AppState>,
    name: &str,
    payload: serde_json::Value,
) -> Result<String, String> {
    tracing::debug!(command = name, "executing command");

    match name {
        "create_contract" => create_contract(state, parse_args(payload)?).await,
        "get_contract" => get_contract(state, parse_args(payload)?).await,
        "list_contracts" => list_contracts(state, parse_args(or_empty(payload))?).await,
        "add_district" => add_district(state, parse_args(payload)?).await,
        "list_batches" => list_batches(state, parse_args(payload)?).await,

        "get_target_ledger" => get_target_ledger(state, parse_args(payload)?).await,
        "list_ledgers" => list_ledgers(state).await,
        "validate_allocation" => validate_allocation(state, parse_args(payload)?).await,
        "record_allocation" => record_allocation(state, parse_args(payload)?).await,
        "list_allocation_entries" => list_allocation_entries(state, parse_args(payload)?).await,
        "resize_batch" => resize_batch(state, parse_args(payload)?).await,

        "onboard_resource" => onboard_resource(state, parse_args(payload)?).await,
        "set_resource_status" => set_resource_status(state, parse_args(payload)?).await,
        "list_resources" => list_resources(state, parse_args(or_empty(payload))?).await,
        "check_resource" => check_resource(state, parse_args(payload)?).await,
        "lock_resource" => lock_resource(state, parse_args(payload)?).await,
        "release_resource" => release_resource(state, parse_args(payload)?).await,
        "resource_history" => resource_history(state, parse_args(payload)?).await,
        "resource_summary" => resource_summary(state).await,

        "record_stage_progress" => record_stage_progress(state, parse_args(payload)?).await,
        "get_burndown" => get_burndown(state, parse_args(or_empty(payload))?).await,
        "get_contract_burndown" => get_contract_burndown(state, parse_args(payload)?).await,

        "open_center" => open_center(state, parse_args(payload)?).await,
        "complete_contract" => complete_contract(state, parse_args(payload)?).await,

        other => Err(map_api_error(ApiError::InvalidInput(format!(
            "unknown command: {}",
            other
        )))),
    }
}

/// Commands whose arguments are all optional accept a missing payload
fn or_empty(payload: serde_json::Value) -> serde_json::Value {
    if payload.is_null() {
        serde_json::json!({})
    } else {
        payload
    }
}
