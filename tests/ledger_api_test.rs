// ==========================================
// Allocation ledger API integration tests
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod ledger_api_test {
    use super::test_helpers::*;
    use skillflow_ledger::api::ApiError;
    use skillflow_ledger::domain::NewBatch;
    use skillflow_ledger::{ContractStatus, EntryStatus};

    fn new_batch(contract_id: &str, job_role_id: &str, batch_id: &str, students: i64) -> NewBatch {
        NewBatch {
            batch_id: batch_id.to_string(),
            contract_id: contract_id.to_string(),
            job_role_id: job_role_id.to_string(),
            center_id: format!("CTR-{}", batch_id),
            allocated_students: students,
        }
    }

    #[test]
    fn test_validate_exact_remaining_then_one_over() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 50)]);
        state
            .ledger_api
            .commit_new_batch(&new_batch(&contract.contract_id, "jr1", "B1", 20), ACTOR)
            .unwrap();

        let decision = state
            .ledger_api
            .validate_allocation(&contract.contract_id, "jr1", 30, None)
            .unwrap();
        assert!(decision.approved);
        assert_eq!(decision.remaining, 30);
        assert_eq!(decision.remaining_after, Some(0));

        let err = state
            .ledger_api
            .validate_allocation(&contract.contract_id, "jr1", 31, None)
            .unwrap_err();
        match &err {
            ApiError::OverAllocation {
                requested,
                remaining,
                job_role_name,
                ..
            } => {
                assert_eq!(*requested, 31);
                assert_eq!(*remaining, 30);
                assert_eq!(job_role_name, "Role jr1");
            }
            other => panic!("expected OverAllocation, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Over-allocation: requested 31 but only 30 remaining for Role jr1"
        );
    }

    #[test]
    fn test_ledger_totals_and_utilization() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 50), ("jr2", 0)]);
        let id = &contract.contract_id;
        state
            .ledger_api
            .commit_new_batch(&new_batch(id, "jr1", "B1", 20), ACTOR)
            .unwrap();
        state
            .ledger_api
            .commit_new_batch(&new_batch(id, "jr1", "B2", 5), ACTOR)
            .unwrap();

        let ledger = state.ledger_api.get_ledger(id).unwrap();
        assert_eq!(ledger.total_target, 50);
        assert_eq!(ledger.total_allocated, 25);
        assert_eq!(ledger.total_remaining, 25);
        assert_eq!(ledger.utilization_percent, 50.0);
        assert_eq!(ledger.centers_opened, 2);

        let jr1 = &ledger.job_roles[0];
        assert_eq!(jr1.center_allocations.len(), 2);
        assert!(!jr1.is_fully_allocated);

        // target 0 is always fully allocated, utilization 0
        let jr2 = &ledger.job_roles[1];
        assert!(jr2.is_fully_allocated);
        assert_eq!(jr2.utilization_percent, 0.0);
    }

    #[test]
    fn test_unknown_contract_and_job_role() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 50)]);

        assert!(matches!(
            state.ledger_api.get_ledger("missing"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            state
                .ledger_api
                .validate_allocation(&contract.contract_id, "nope", 1, None),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            state
                .ledger_api
                .validate_allocation(&contract.contract_id, "jr1", -1, None),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_commit_rejects_over_allocation_without_writing() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 10)]);
        let id = &contract.contract_id;

        let err = state
            .ledger_api
            .commit_new_batch(&new_batch(id, "jr1", "B1", 11), ACTOR)
            .unwrap_err();
        assert!(matches!(err, ApiError::OverAllocation { remaining: 10, .. }));

        assert!(state.ledger_api.list_allocation_entries(id).unwrap().is_empty());
        assert_eq!(state.ledger_api.get_ledger(id).unwrap().total_allocated, 0);
    }

    #[test]
    fn test_resize_excludes_own_seats() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 50)]);
        let id = &contract.contract_id;
        state
            .ledger_api
            .commit_new_batch(&new_batch(id, "jr1", "B1", 40), ACTOR)
            .unwrap();

        // without exclusion only 10 remain; with it the full 50 is available
        assert!(state.ledger_api.validate_allocation(id, "jr1", 45, None).is_err());
        let decision = state
            .ledger_api
            .validate_allocation(id, "jr1", 45, Some("B1"))
            .unwrap();
        assert_eq!(decision.remaining_after, Some(5));

        let receipt = state.ledger_api.resize_batch("B1", 45, ACTOR).unwrap();
        assert_eq!(receipt.batch.allocated_students, 45);

        let entries = state.ledger_api.list_allocation_entries(id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, EntryStatus::Superseded);
        assert_eq!(entries[1].status, EntryStatus::Active);
        assert_eq!(entries[1].allocated_students, 45);

        assert!(matches!(
            state.ledger_api.resize_batch("B1", 51, ACTOR),
            Err(ApiError::OverAllocation { .. })
        ));
        assert_eq!(state.ledger_api.get_ledger(id).unwrap().total_allocated, 45);
    }

    #[test]
    fn test_record_allocation_is_a_thin_write() {
        let (_tmp, state) = create_test_state();
        let contract = seed_contract(&state, "WO-1", &[("jr1", 50)]);
        let id = &contract.contract_id;
        state
            .ledger_api
            .commit_new_batch(&new_batch(id, "jr1", "B1", 10), ACTOR)
            .unwrap();

        let entry = state
            .ledger_api
            .record_allocation(id, "jr1", "CTR-B1", "B1", 10, ACTOR)
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Active);
        assert_eq!(state.ledger_api.list_allocation_entries(id).unwrap().len(), 2);

        assert!(matches!(
            state
                .ledger_api
                .record_allocation(id, "jr1", "", "B1", 10, ACTOR),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_list_active_ledgers_skips_completed_contracts() {
        let (_tmp, state) = create_test_state();
        let first = seed_contract(&state, "WO-1", &[("jr1", 50)]);
        seed_contract(&state, "WO-2", &[("jr1", 20)]);
        state
            .provisioning_api
            .complete_contract(&first.contract_id, ACTOR)
            .unwrap();

        let ledgers = state.ledger_api.list_active_ledgers().unwrap();
        assert_eq!(ledgers.len(), 1);
        assert_eq!(ledgers[0].work_order_number, "WO-2");
        assert_eq!(ledgers[0].status, ContractStatus::Active);

        // completed contracts take no new batches
        assert!(matches!(
            state
                .ledger_api
                .commit_new_batch(&new_batch(&first.contract_id, "jr1", "B9", 1), ACTOR),
            Err(ApiError::InvalidStateTransition { .. })
        ));
    }
}
