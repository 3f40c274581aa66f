// ==========================================
// JSON command layer tests
// ==========================================
// Drives execute_command the way an RPC/CLI front end would and checks
// the {code, status, message, details} error contract.
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod command_test {
    use super::test_helpers::*;
    use serde_json::{json, Value};
    use skillflow_ledger::app::{execute_command, AppState, ErrorResponse, COMMAND_NAMES};
    use std::sync::Arc;

    async fn call(state: &Arc<AppState>, name: &str, payload: Value) -> Value {
        let raw = execute_command(Arc::clone(state), name, payload)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
        serde_json::from_str(&raw).unwrap()
    }

    async fn call_err(state: &Arc<AppState>, name: &str, payload: Value) -> ErrorResponse {
        let raw = execute_command(Arc::clone(state), name, payload)
            .await
            .expect_err("command should fail");
        serde_json::from_str(&raw).unwrap()
    }

    async fn create_contract(state: &Arc<AppState>, target: i64) -> String {
        let contract = call(
            state,
            "create_contract",
            json!({
                "work_order_number": "WO-CMD-1",
                "job_roles": [{
                    "job_role_id": "jr1",
                    "job_role_code": "JR1",
                    "job_role_name": "Sewing Operator",
                    "target_students": target
                }],
                "actor": ACTOR
            }),
        )
        .await;
        assert_eq!(contract["status"], "active");
        contract["contract_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_allocation_round_trip_through_commands() {
        let (_tmp, state) = create_test_state();
        let contract_id = create_contract(&state, 40).await;

        let decision = call(
            &state,
            "validate_allocation",
            json!({ "contract_id": contract_id, "job_role_id": "jr1", "requested_students": 40 }),
        )
        .await;
        assert_eq!(decision["approved"], true);

        call(
            &state,
            "onboard_resource",
            json!({ "resource_type": "trainer", "resource_id": "T1", "name": "Asha" }),
        )
        .await;
        let opened = call(
            &state,
            "open_center",
            json!({
                "contract_id": contract_id,
                "job_role_id": "jr1",
                "center_id": "C1",
                "students": 25,
                "trainer_id": "T1",
                "start_date": "2025-04-01",
                "end_date": "2025-06-30",
                "actor": ACTOR
            }),
        )
        .await;
        assert_eq!(opened["locked_resources"][0]["resource"]["status"], "assigned");

        let ledger = call(&state, "get_target_ledger", json!({ "contract_id": contract_id })).await;
        assert_eq!(ledger["total_allocated"], 25);
        assert_eq!(ledger["total_remaining"], 15);

        let err = call_err(
            &state,
            "validate_allocation",
            json!({ "contract_id": contract_id, "job_role_id": "jr1", "requested_students": 16 }),
        )
        .await;
        assert_eq!(err.code, "OVER_ALLOCATION");
        assert_eq!(err.status, 422);
        let details = err.details.unwrap();
        assert_eq!(details["remaining"], 15);
        assert_eq!(details["requested"], 16);
        assert_eq!(details["job_role_name"], "Sewing Operator");
    }

    #[tokio::test]
    async fn test_resource_conflict_carries_holder() {
        let (_tmp, state) = create_test_state();
        call(
            &state,
            "onboard_resource",
            json!({ "resource_type": "infrastructure", "resource_id": "LAB-1", "name": "Lab" }),
        )
        .await;
        let lock = json!({
            "resource_type": "infrastructure",
            "resource_id": "LAB-1",
            "center_id": "C1",
            "batch_id": "B1",
            "actor": ACTOR
        });
        call(&state, "lock_resource", lock.clone()).await;

        let mut second = lock;
        second["center_id"] = json!("C2");
        let err = call_err(&state, "lock_resource", second).await;
        assert_eq!(err.code, "RESOURCE_CONFLICT");
        assert_eq!(err.status, 409);
        assert_eq!(err.details.unwrap()["holder"]["center_id"], "C1");
    }

    #[tokio::test]
    async fn test_input_errors() {
        let (_tmp, state) = create_test_state();

        let err = call_err(
            &state,
            "check_resource",
            json!({ "resource_type": "projector", "resource_id": "P1" }),
        )
        .await;
        assert_eq!(err.code, "INVALID_RESOURCE_TYPE");
        assert_eq!(err.status, 400);

        let err = call_err(
            &state,
            "check_resource",
            json!({ "resource_type": "trainer", "resource_id": "T1", "start_date": "2025-13-01", "end_date": "2025-12-31" }),
        )
        .await;
        assert_eq!(err.code, "INVALID_INPUT");

        let err = call_err(&state, "get_contract", json!({ "id": "missing" })).await;
        assert_eq!(err.code, "INVALID_INPUT");

        let err = call_err(&state, "get_contract", json!({ "contract_id": "missing" })).await;
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.status, 404);

        let err = call_err(&state, "launch_rocket", Value::Null).await;
        assert_eq!(err.code, "INVALID_INPUT");
        assert!(err.message.contains("launch_rocket"));
    }

    #[tokio::test]
    async fn test_optional_payload_commands_accept_null() {
        let (_tmp, state) = create_test_state();
        create_contract(&state, 10).await;

        let report = call(&state, "get_burndown", Value::Null).await;
        assert_eq!(report["overall"]["total_contracts"], 1);
        assert_eq!(report["overall"]["total_target"], 10);

        let contracts = call(&state, "list_contracts", Value::Null).await;
        assert_eq!(contracts.as_array().unwrap().len(), 1);

        call(
            &state,
            "onboard_resource",
            json!({ "resource_type": "manager", "resource_id": "M1", "name": "Ravi" }),
        )
        .await;
        let resources = call(&state, "list_resources", Value::Null).await;
        assert_eq!(resources.as_array().unwrap().len(), 1);
        let trainers = call(&state, "list_resources", json!({ "resource_type": "trainer" })).await;
        assert!(trainers.as_array().unwrap().is_empty());

        let summary = call(&state, "resource_summary", Value::Null).await;
        assert_eq!(summary.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_command_names_are_unique() {
        let mut names: Vec<&str> = COMMAND_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMAND_NAMES.len());
    }
}
