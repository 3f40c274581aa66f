// ==========================================
// Resource locking integration tests
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod resource_lock_test {
    use super::test_helpers::*;
    use chrono::NaiveDate;
    use skillflow_ledger::api::ApiError;
    use skillflow_ledger::domain::{ConflictReason, LockRequest};
    use skillflow_ledger::{Availability, BookingStatus, DateRange, ResourceKind, ResourceStatus};

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    fn lock_request(
        kind: ResourceKind,
        resource_id: &str,
        center_id: &str,
        batch_id: Option<&str>,
        date_range: Option<DateRange>,
    ) -> LockRequest {
        LockRequest {
            resource_kind: kind,
            resource_id: resource_id.to_string(),
            center_id: center_id.to_string(),
            batch_id: batch_id.map(str::to_string),
            date_range,
            actor: ACTOR.to_string(),
        }
    }

    #[test]
    fn test_trainer_lock_conflict_release_relock() {
        let (_tmp, state) = create_test_state();
        seed_contract(&state, "WO-1", &[("jr1", 50)]);
        seed_resource(&state, ResourceKind::Trainer, "T1");
        let api = &state.resource_api;

        let receipt = api
            .lock_resource(&lock_request(ResourceKind::Trainer, "T1", "C1", Some("B1"), None))
            .unwrap();
        assert_eq!(receipt.resource.status, ResourceStatus::Assigned);
        assert_eq!(receipt.resource.assigned_center_id.as_deref(), Some("C1"));
        assert_eq!(receipt.booking.status, BookingStatus::Active);

        let err = api
            .lock_resource(&lock_request(ResourceKind::Trainer, "T1", "C2", Some("B2"), None))
            .unwrap_err();
        match &err {
            ApiError::ResourceConflict { reason, holder, .. } => {
                assert_eq!(*reason, ConflictReason::AlreadyAssigned);
                let holder = holder.as_ref().unwrap();
                assert_eq!(holder.center_id, "C1");
                assert_eq!(holder.batch_id.as_deref(), Some("B1"));
            }
            other => panic!("expected ResourceConflict, got {:?}", other),
        }
        assert!(err.to_string().contains("C1"));

        api.release_resource(ResourceKind::Trainer, "T1", ACTOR).unwrap();
        let receipt = api
            .lock_resource(&lock_request(ResourceKind::Trainer, "T1", "C2", Some("B2"), None))
            .unwrap();
        assert_eq!(receipt.resource.assigned_center_id.as_deref(), Some("C2"));
    }

    #[test]
    fn test_release_is_idempotent() {
        let (_tmp, state) = create_test_state();
        seed_resource(&state, ResourceKind::Infrastructure, "I1");
        let api = &state.resource_api;
        api.lock_resource(&lock_request(ResourceKind::Infrastructure, "I1", "C1", Some("B1"), None))
            .unwrap();

        let first = api
            .release_resource(ResourceKind::Infrastructure, "I1", ACTOR)
            .unwrap();
        assert!(first.was_assigned);
        assert_eq!(first.closed_bookings, 1);
        assert_eq!(first.resource.status, ResourceStatus::Available);
        assert!(first.resource.assigned_center_id.is_none());

        let second = api
            .release_resource(ResourceKind::Infrastructure, "I1", ACTOR)
            .unwrap();
        assert!(!second.was_assigned);
        assert_eq!(second.closed_bookings, 0);
        assert_eq!(second.resource.status, ResourceStatus::Available);
    }

    #[test]
    fn test_check_availability_exclude_center() {
        let (_tmp, state) = create_test_state();
        seed_resource(&state, ResourceKind::Manager, "M1");
        let api = &state.resource_api;
        api.lock_resource(&lock_request(ResourceKind::Manager, "M1", "C1", Some("B1"), None))
            .unwrap();

        let same_center = api
            .check_availability(ResourceKind::Manager, "M1", None, Some("C1"))
            .unwrap();
        assert!(same_center.is_available());

        let other_center = api
            .check_availability(ResourceKind::Manager, "M1", None, Some("C2"))
            .unwrap();
        match other_center {
            Availability::NotAvailable { holder, .. } => {
                // managers are held by center only
                let holder = holder.unwrap();
                assert_eq!(holder.center_id, "C1");
                assert!(holder.batch_id.is_none());
            }
            Availability::Available => panic!("expected NotAvailable"),
        }
    }

    #[test]
    fn test_date_overlap_reported_on_check() {
        let (_tmp, state) = create_test_state();
        seed_resource(&state, ResourceKind::Trainer, "T1");
        let api = &state.resource_api;
        api.lock_resource(&lock_request(
            ResourceKind::Trainer,
            "T1",
            "C1",
            Some("B1"),
            Some(range((2025, 1, 1), (2025, 1, 31))),
        ))
        .unwrap();

        let overlapping = range((2025, 1, 15), (2025, 2, 15));
        match api
            .check_availability(ResourceKind::Trainer, "T1", Some(&overlapping), None)
            .unwrap()
        {
            Availability::NotAvailable {
                conflicting_bookings,
                ..
            } => assert_eq!(conflicting_bookings.len(), 1),
            Availability::Available => panic!("expected conflict"),
        }

        let disjoint = range((2025, 2, 1), (2025, 2, 28));
        match api
            .check_availability(ResourceKind::Trainer, "T1", Some(&disjoint), None)
            .unwrap()
        {
            // still assigned, but no booking overlaps the requested dates
            Availability::NotAvailable {
                reason,
                conflicting_bookings,
                ..
            } => {
                assert_eq!(reason, ConflictReason::AlreadyAssigned);
                assert!(conflicting_bookings.is_empty());
            }
            Availability::Available => panic!("assigned trainer cannot be available"),
        }
    }

    #[test]
    fn test_history_newest_first_with_dates() {
        let (_tmp, state) = create_test_state();
        seed_resource(&state, ResourceKind::Trainer, "T1");
        let api = &state.resource_api;

        api.lock_resource(&lock_request(
            ResourceKind::Trainer,
            "T1",
            "C1",
            Some("B1"),
            Some(range((2025, 1, 1), (2025, 1, 31))),
        ))
        .unwrap();
        api.release_resource(ResourceKind::Trainer, "T1", ACTOR).unwrap();
        api.lock_resource(&lock_request(ResourceKind::Trainer, "T1", "C2", Some("B2"), None))
            .unwrap();

        let history = api.booking_history(ResourceKind::Trainer, "T1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].center_id, "C2");
        assert_eq!(history[0].status, BookingStatus::Active);
        assert_eq!(history[1].center_id, "C1");
        assert_eq!(history[1].status, BookingStatus::Completed);
        assert_eq!(history[1].released_by.as_deref(), Some(ACTOR));
        assert_eq!(
            history[1].date_range,
            Some(range((2025, 1, 1), (2025, 1, 31)))
        );
    }

    #[test]
    fn test_unknown_resource_is_not_found() {
        let (_tmp, state) = create_test_state();
        let api = &state.resource_api;
        assert!(matches!(
            api.check_availability(ResourceKind::Trainer, "ghost", None, None),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.lock_resource(&lock_request(ResourceKind::Trainer, "ghost", "C1", None, None)),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.release_resource(ResourceKind::Trainer, "ghost", ACTOR),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.booking_history(ResourceKind::Trainer, "ghost"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_leave_blocks_lock_and_summary_counts() {
        let (_tmp, state) = create_test_state();
        seed_resource(&state, ResourceKind::Trainer, "T1");
        seed_resource(&state, ResourceKind::Trainer, "T2");
        seed_resource(&state, ResourceKind::Manager, "M1");
        let api = &state.resource_api;

        api.set_resource_status(ResourceKind::Trainer, "T1", "on_leave")
            .unwrap();
        let err = api
            .lock_resource(&lock_request(ResourceKind::Trainer, "T1", "C1", None, None))
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::ResourceConflict {
                reason: ConflictReason::OnLeave,
                ..
            }
        ));

        api.lock_resource(&lock_request(ResourceKind::Trainer, "T2", "C1", Some("B1"), None))
            .unwrap();
        // assignment only changes through lock / release
        assert!(matches!(
            api.set_resource_status(ResourceKind::Trainer, "T2", "maintenance"),
            Err(ApiError::InvalidStateTransition { .. })
        ));

        let summary = api.summary().unwrap();
        let trainers = &summary[&ResourceKind::Trainer];
        assert_eq!(trainers.total, 2);
        assert_eq!(trainers.on_leave, 1);
        assert_eq!(trainers.assigned, 1);
        assert_eq!(summary[&ResourceKind::Manager].available, 1);
    }

    #[test]
    fn test_onboard_generates_id_and_rejects_duplicates() {
        let (_tmp, state) = create_test_state();
        let api = &state.resource_api;

        let generated = api
            .onboard_resource(ResourceKind::Infrastructure, None, "Hall A")
            .unwrap();
        assert!(!generated.resource_id.is_empty());
        assert_eq!(generated.status, ResourceStatus::Available);

        seed_resource(&state, ResourceKind::Trainer, "T1");
        assert!(api
            .onboard_resource(ResourceKind::Trainer, Some("T1".to_string()), "Again")
            .is_err());
        // same id under another kind is a different resource
        assert!(api
            .onboard_resource(ResourceKind::Manager, Some("T1".to_string()), "Manager T1")
            .is_ok());
    }
}
