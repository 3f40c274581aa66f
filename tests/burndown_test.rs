// ==========================================
// Burn-down integration tests
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod burndown_test {
    use super::test_helpers::*;
    use skillflow_ledger::api::ApiError;
    use skillflow_ledger::app::AppState;
    use skillflow_ledger::domain::NewBatch;

    fn open_batch(state: &AppState, contract_id: &str, job_role_id: &str, batch_id: &str, n: i64) {
        state
            .ledger_api
            .commit_new_batch(
                &NewBatch {
                    batch_id: batch_id.to_string(),
                    contract_id: contract_id.to_string(),
                    job_role_id: job_role_id.to_string(),
                    center_id: format!("CTR-{}", batch_id),
                    allocated_students: n,
                },
                ACTOR,
            )
            .unwrap();
    }

    #[test]
    fn test_pipeline_from_stage_progress() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 60), ("jr2", 40)]);
        let id = &contract.contract_id;
        open_batch(&state, id, "jr1", "B1", 50);
        open_batch(&state, id, "jr2", "B2", 30);

        let api = &state.contract_api;
        api.record_stage_progress("B1", "mobilization", 30).unwrap();
        api.record_stage_progress("B2", "mobilization", 20).unwrap();
        api.record_stage_progress("B1", "training", 30).unwrap();
        api.record_stage_progress("B1", "placement", 5).unwrap();

        let burndown = state.burndown_api.get_contract_burndown(id).unwrap();
        let p = &burndown.pipeline;
        assert_eq!(p.unallocated, 20);
        assert_eq!(p.allocated_not_started, 30);
        assert_eq!(p.mobilized, 50);
        assert_eq!(p.awaiting_training, 20);
        assert_eq!(p.in_training, 30);
        // placement ahead of assessment clamps to zero
        assert_eq!(p.awaiting_placement, 0);
        assert_eq!(p.placed, 5);
        assert!(p.as_ordered().iter().all(|v| *v >= 0));

        assert_eq!(burndown.summary.total_target, 100);
        assert_eq!(burndown.summary.total_allocated, 80);
        assert_eq!(burndown.summary.completion_percent, 5.0);
        assert_eq!(burndown.centers_count, 2);
    }

    #[test]
    fn test_progress_overwrites_previous_count() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 10)]);
        open_batch(&state, &contract.contract_id, "jr1", "B1", 10);

        state
            .contract_api
            .record_stage_progress("B1", "mobilization", 4)
            .unwrap();
        state
            .contract_api
            .record_stage_progress("B1", "mobilization", 9)
            .unwrap();

        let burndown = state
            .burndown_api
            .get_contract_burndown(&contract.contract_id)
            .unwrap();
        assert_eq!(burndown.summary.total_mobilized, 9);
    }

    #[test]
    fn test_report_overall_totals() {
        let (_tmp, state) = create_test_state();
        let first = seed_contract(&state, "WO-1", &[("jr1", 100)]);
        let second = seed_contract(&state, "WO-2", &[("jr1", 50)]);
        open_batch(&state, &first.contract_id, "jr1", "B1", 100);
        open_batch(&state, &second.contract_id, "jr1", "B2", 10);
        state
            .contract_api
            .record_stage_progress("B1", "placement", 25)
            .unwrap();

        let report = state.burndown_api.get_burndown(None).unwrap();
        assert_eq!(report.contracts.len(), 2);
        assert_eq!(report.overall.total_contracts, 2);
        assert_eq!(report.overall.total_target, 150);
        assert_eq!(report.overall.total_allocated, 110);
        assert_eq!(report.overall.total_unallocated, 40);
        assert_eq!(report.overall.total_placed, 25);
        assert_eq!(report.overall.overall_completion, 16.7);

        let single = state
            .burndown_api
            .get_burndown(Some(&second.contract_id))
            .unwrap();
        assert_eq!(single.contracts.len(), 1);
        assert_eq!(single.overall.total_target, 50);
    }

    #[test]
    fn test_bad_progress_input() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 10)]);
        open_batch(&state, &contract.contract_id, "jr1", "B1", 10);
        let api = &state.contract_api;

        assert!(matches!(
            api.record_stage_progress("B1", "graduation", 1),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.record_stage_progress("B1", "training", -1),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.record_stage_progress("missing", "training", 1),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            state.burndown_api.get_contract_burndown("missing"),
            Err(ApiError::NotFound(_))
        ));
    }
}
