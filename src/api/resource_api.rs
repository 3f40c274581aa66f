// ==========================================
// SkillFlow Ledger - resource locking API
// ==========================================
// CheckAvailability / LockResource / ReleaseResource / BookingHistory
// Exclusivity: a resource is held by at most one center at a time
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::ledger_api::require_non_empty;
use crate::config::EngineSettings;
use crate::domain::resource::{
    Availability, Booking, DateRange, LockOutcome, LockRequest, ReleaseOutcome, Resource,
    ResourceKindSummary,
};
use crate::domain::types::{ResourceKind, ResourceStatus};
use crate::engine::resource_lock::ResourceLockEvaluator;
use crate::repository::ResourceRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A granted lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockReceipt {
    pub resource: Resource,
    pub booking: Booking,
}

/// Parse an external resource type string
///
/// # Returns
/// - `Err(InvalidResourceType)`: anything but trainer / manager / infrastructure
pub fn parse_resource_kind(raw: &str) -> ApiResult<ResourceKind> {
    ResourceKind::from_db_str(raw.trim().to_ascii_lowercase().as_str())
        .ok_or_else(|| ApiError::InvalidResourceType(raw.to_string()))
}

fn parse_resource_status(raw: &str) -> ApiResult<ResourceStatus> {
    ResourceStatus::from_db_str(raw.trim().to_ascii_lowercase().as_str()).ok_or_else(|| {
        ApiError::InvalidInput(format!(
            "unknown resource status: {} (expected available, on_leave or maintenance)",
            raw
        ))
    })
}

// ==========================================
// ResourceApi
// ==========================================
pub struct ResourceApi {
    resource_repo: Arc<ResourceRepository>,
    evaluator: ResourceLockEvaluator,
    booking_history_limit: usize,
}

impl ResourceApi {
    pub fn new(resource_repo: Arc<ResourceRepository>, settings: &EngineSettings) -> Self {
        Self {
            resource_repo,
            evaluator: ResourceLockEvaluator::new(),
            booking_history_limit: settings.booking_history_limit,
        }
    }

    // ==========================================
    // Registry
    // ==========================================

    /// Register a trainer / manager / infrastructure item as available
    ///
    /// # Arguments
    /// - `resource_id`: generated when absent
    pub fn onboard_resource(
        &self,
        kind: ResourceKind,
        resource_id: Option<String>,
        name: &str,
    ) -> ApiResult<Resource> {
        require_non_empty("name", name)?;
        let resource_id = match resource_id {
            Some(id) => {
                require_non_empty("resource_id", &id)?;
                id.trim().to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        let now = Utc::now().naive_utc();
        let resource = Resource {
            resource_kind: kind,
            resource_id,
            name: name.trim().to_string(),
            status: ResourceStatus::Available,
            assigned_center_id: None,
            assigned_batch_id: None,
            created_at: now,
            updated_at: now,
        };
        self.resource_repo.insert(&resource)?;

        info!(resource_kind = %kind, resource_id = %resource.resource_id, "resource onboarded");
        Ok(resource)
    }

    /// Move a resource to leave / maintenance / available
    pub fn set_resource_status(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        status: &str,
    ) -> ApiResult<Resource> {
        let status = parse_resource_status(status)?;
        let resource = self.resource_repo.set_status(kind, resource_id, status)?;
        info!(resource_kind = %kind, resource_id, status = status.to_db_str(), "resource status changed");
        Ok(resource)
    }

    pub fn get_resource(&self, kind: ResourceKind, resource_id: &str) -> ApiResult<Resource> {
        self.resource_repo
            .find(kind, resource_id)?
            .ok_or_else(|| not_found(kind, resource_id))
    }

    pub fn list_resources(&self, kind: Option<ResourceKind>) -> ApiResult<Vec<Resource>> {
        Ok(self.resource_repo.list(kind)?)
    }

    /// Resource counts by kind and status
    pub fn summary(&self) -> ApiResult<BTreeMap<ResourceKind, ResourceKindSummary>> {
        Ok(self.resource_repo.summary()?)
    }

    // ==========================================
    // Availability / locking
    // ==========================================

    /// Whether a resource could be locked now (read-only)
    ///
    /// # Arguments
    /// - `date_range`: also reports active bookings overlapping it
    /// - `exclude_center_id`: a resource held by this center reads as available
    pub fn check_availability(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        date_range: Option<&DateRange>,
        exclude_center_id: Option<&str>,
    ) -> ApiResult<Availability> {
        let resource = self.get_resource(kind, resource_id)?;
        let active = self.resource_repo.active_bookings(kind, resource_id)?;
        Ok(self
            .evaluator
            .evaluate(&resource, &active, date_range, exclude_center_id))
    }

    /// Atomically take a resource for a center / batch
    ///
    /// The availability check runs inside the write transaction, so two
    /// concurrent lock requests cannot both succeed.
    ///
    /// # Returns
    /// - `Err(ResourceConflict)`: not available; carries the current holder
    /// - `Err(NotFound)`: unknown resource
    #[instrument(skip(self, request), fields(
        resource_kind = %request.resource_kind,
        resource_id = %request.resource_id,
        center_id = %request.center_id
    ))]
    pub fn lock_resource(&self, request: &LockRequest) -> ApiResult<LockReceipt> {
        require_non_empty("resource_id", &request.resource_id)?;
        require_non_empty("center_id", &request.center_id)?;
        require_non_empty("actor", &request.actor)?;

        let outcome = self.resource_repo.lock_with(request, |resource, active| {
            self.evaluator
                .evaluate(resource, active, request.date_range.as_ref(), None)
        })?;

        match outcome {
            LockOutcome::Locked { resource, booking } => {
                info!(booking_id = %booking.booking_id, "resource locked");
                Ok(LockReceipt { resource, booking })
            }
            LockOutcome::Rejected(availability) => {
                warn!("resource lock rejected");
                Err(conflict(request.resource_kind, &request.resource_id, availability))
            }
        }
    }

    /// Return a resource to the pool and close its active bookings
    ///
    /// Releasing an already available resource is a successful no-op.
    #[instrument(skip(self))]
    pub fn release_resource(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        actor: &str,
    ) -> ApiResult<ReleaseOutcome> {
        require_non_empty("actor", actor)?;
        let outcome = self.resource_repo.release(kind, resource_id, actor)?;
        if outcome.was_assigned || outcome.closed_bookings > 0 {
            info!(closed_bookings = outcome.closed_bookings, "resource released");
        }
        Ok(outcome)
    }

    /// Undo one lock, but only while the receipt's booking is still active
    ///
    /// # Returns
    /// - `Ok(None)`: the resource was released and re-locked since; the newer
    ///   holder is left in place
    pub fn release_lock(
        &self,
        receipt: &LockReceipt,
        actor: &str,
    ) -> ApiResult<Option<ReleaseOutcome>> {
        require_non_empty("actor", actor)?;
        let booking = &receipt.booking;
        let outcome = self.resource_repo.release_if_held(
            booking.resource_kind,
            &booking.resource_id,
            &booking.booking_id,
            actor,
        )?;
        if outcome.is_none() {
            warn!(
                resource_kind = %booking.resource_kind,
                resource_id = %booking.resource_id,
                booking_id = %booking.booking_id,
                "booking no longer active, lock left to its current holder"
            );
        }
        Ok(outcome)
    }

    /// Bookings of one resource, newest first, capped by configuration
    pub fn booking_history(&self, kind: ResourceKind, resource_id: &str) -> ApiResult<Vec<Booking>> {
        self.get_resource(kind, resource_id)?;
        Ok(self
            .resource_repo
            .booking_history(kind, resource_id, self.booking_history_limit)?)
    }
}

fn not_found(kind: ResourceKind, resource_id: &str) -> ApiError {
    ApiError::NotFound(format!("Resource(id={}/{})", kind, resource_id))
}

/// Turn a negative availability into the conflict error
pub(crate) fn conflict(kind: ResourceKind, resource_id: &str, availability: Availability) -> ApiError {
    match availability {
        Availability::NotAvailable {
            reason,
            holder,
            conflicting_bookings,
        } => ApiError::ResourceConflict {
            resource_kind: kind,
            resource_id: resource_id.to_string(),
            reason,
            holder,
            conflicting_bookings,
        },
        Availability::Available => ApiError::InternalError(format!(
            "{} {} reported available but was not locked",
            kind, resource_id
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_kind() {
        assert_eq!(parse_resource_kind("trainer").unwrap(), ResourceKind::Trainer);
        assert_eq!(parse_resource_kind(" Manager ").unwrap(), ResourceKind::Manager);
        assert!(matches!(
            parse_resource_kind("vehicle"),
            Err(ApiError::InvalidResourceType(raw)) if raw == "vehicle"
        ));
    }

    #[test]
    fn test_parse_resource_status() {
        assert_eq!(parse_resource_status("on_leave").unwrap(), ResourceStatus::OnLeave);
        assert!(parse_resource_status("retired").is_err());
    }
}
