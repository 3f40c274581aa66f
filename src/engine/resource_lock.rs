// ==========================================
// SkillFlow Ledger - resource availability engine
// ==========================================
// Input: resource row + its active bookings + optional date range
// Output: Availability (with the competing holder / bookings on conflict)
// Pure rule code: the lock itself is applied by ResourceRepository::lock_with
// ==========================================

use crate::domain::resource::{Availability, Booking, ConflictReason, DateRange, Resource};
use crate::domain::types::ResourceStatus;
use tracing::debug;

/// Inclusive three-way overlap test
///
/// existing.start <= new.start <= existing.end
/// OR existing.start <= new.end <= existing.end
/// OR (new.start <= existing.start AND existing.end <= new.end)
pub fn ranges_overlap(existing: &DateRange, requested: &DateRange) -> bool {
    (existing.start <= requested.start && requested.start <= existing.end)
        || (existing.start <= requested.end && requested.end <= existing.end)
        || (requested.start <= existing.start && existing.end <= requested.end)
}

// ==========================================
// ResourceLockEvaluator
// ==========================================
pub struct ResourceLockEvaluator {
    // stateless
}

impl ResourceLockEvaluator {
    pub fn new() -> Self {
        Self {}
    }

    /// Decide whether `resource` can be handed to a new holder
    ///
    /// # Arguments
    /// - `active_bookings`: the resource's bookings with status `active`
    /// - `date_range`: when present, active bookings overlapping it are conflicts
    /// - `exclude_center_id`: a resource already held by this center counts as
    ///   available (same center re-checking itself); the date scan is skipped then
    pub fn evaluate(
        &self,
        resource: &Resource,
        active_bookings: &[Booking],
        date_range: Option<&DateRange>,
        exclude_center_id: Option<&str>,
    ) -> Availability {
        if let Some(reason) = ConflictReason::from_status(resource.status) {
            let held_by_excluded = resource.status == ResourceStatus::Assigned
                && exclude_center_id.is_some()
                && resource.assigned_center_id.as_deref() == exclude_center_id;
            if held_by_excluded {
                debug!(
                    resource_id = %resource.resource_id,
                    "resource held by the excluded center, treated as available"
                );
                return Availability::Available;
            }

            let conflicting_bookings = match date_range {
                Some(range) => overlapping(active_bookings, range),
                None => active_bookings.to_vec(),
            };
            return Availability::NotAvailable {
                reason,
                holder: resource.holder(),
                conflicting_bookings,
            };
        }

        if let Some(range) = date_range {
            let conflicts = overlapping(active_bookings, range);
            if !conflicts.is_empty() {
                return Availability::NotAvailable {
                    reason: ConflictReason::BookingOverlap,
                    holder: resource.holder(),
                    conflicting_bookings: conflicts,
                };
            }
        }

        Availability::Available
    }
}

impl Default for ResourceLockEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Bookings whose interval overlaps `range`; open-ended bookings never do
fn overlapping(bookings: &[Booking], range: &DateRange) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| b.date_range.map_or(false, |r| ranges_overlap(&r, range)))
        .cloned()
        .collect()
}
