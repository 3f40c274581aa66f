use super::bookings::{insert_booking, load_active_bookings};
use super::core::{load_resource, resource_key, ResourceRepository};
use crate::domain::resource::{
    Availability, Booking, ConflictReason, LockOutcome, LockRequest, ReleaseOutcome, Resource,
};
use crate::domain::types::{BookingStatus, ResourceKind, ResourceStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, now_ts};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

// ==========================================
// Lock / release
// ==========================================
impl ResourceRepository {
    /// Atomically check and lock one resource
    ///
    /// Inside a single IMMEDIATE transaction:
    /// 1. load the resource and its active bookings
    /// 2. run `evaluate` on that state (no other writer can interleave)
    /// 3. compare-and-swap `available -> assigned`
    /// 4. append the active booking
    ///
    /// # Returns
    /// - `Ok(LockOutcome::Locked)`: both writes committed
    /// - `Ok(LockOutcome::Rejected)`: nothing written; carries the competing holder
    /// - `Err(NotFound)`: unknown resource
    pub fn lock_with<F>(&self, request: &LockRequest, evaluate: F) -> RepositoryResult<LockOutcome>
    where
        F: FnOnce(&Resource, &[Booking]) -> Availability,
    {
        let kind = request.resource_kind;
        let resource_id = request.resource_id.as_str();

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let resource = load_resource(&tx, kind, resource_id)?
            .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;
        let active = load_active_bookings(&tx, kind, resource_id)?;

        let availability = evaluate(&resource, &active);
        if !availability.is_available() {
            return Ok(LockOutcome::Rejected(availability));
        }

        let now = now_ts();
        let assigned_batch_id = if kind.binds_batch() {
            request.batch_id.clone()
        } else {
            None
        };

        let swapped = tx.execute(
            "UPDATE resource SET status = 'assigned', assigned_center_id = ?1, \
             assigned_batch_id = ?2, updated_at = ?3 \
             WHERE resource_kind = ?4 AND resource_id = ?5 \
             AND status = 'available' AND is_deleted = 0",
            params![
                request.center_id,
                assigned_batch_id,
                format_ts(&now),
                kind.to_db_str(),
                resource_id
            ],
        )?;

        if swapped == 0 {
            // evaluate() accepted a resource that is not available (e.g. a same-center re-check)
            let current = load_resource(&tx, kind, resource_id)?
                .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;
            return Ok(LockOutcome::Rejected(Availability::NotAvailable {
                reason: ConflictReason::from_status(current.status)
                    .unwrap_or(ConflictReason::AlreadyAssigned),
                holder: current.holder(),
                conflicting_bookings: active,
            }));
        }

        let booking = Booking {
            booking_id: Uuid::new_v4().to_string(),
            resource_kind: kind,
            resource_id: resource_id.to_string(),
            center_id: request.center_id.clone(),
            batch_id: request.batch_id.clone(),
            date_range: request.date_range,
            status: BookingStatus::Active,
            locked_by: request.actor.clone(),
            locked_at: now,
            released_by: None,
            released_at: None,
        };
        insert_booking(&tx, &booking)?;

        let resource = load_resource(&tx, kind, resource_id)?
            .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(LockOutcome::Locked { resource, booking })
    }

    /// Release one resource and close its active bookings
    ///
    /// Idempotent: releasing an available resource succeeds and changes nothing.
    pub fn release(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        actor: &str,
    ) -> RepositoryResult<ReleaseOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let outcome = release_in_tx(&tx, kind, resource_id, actor, &now_ts())?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcome)
    }

    /// Release a resource only while `booking_id` is still its active lock
    ///
    /// # Returns
    /// - `Ok(Some(outcome))`: the booking was active; resource released, bookings closed
    /// - `Ok(None)`: the booking is already closed (another holder may own the
    ///   resource now); nothing written
    pub fn release_if_held(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        booking_id: &str,
        actor: &str,
    ) -> RepositoryResult<Option<ReleaseOutcome>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let held: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM booking WHERE booking_id = ?1 \
             AND resource_kind = ?2 AND resource_id = ?3 AND status = 'active')",
            params![booking_id, kind.to_db_str(), resource_id],
            |row| row.get(0),
        )?;
        if !held {
            return Ok(None);
        }

        let outcome = release_in_tx(&tx, kind, resource_id, actor, &now_ts())?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(Some(outcome))
    }
}

/// Release on a caller-owned transaction (shared with the contract completion cascade)
///
/// An assigned resource returns to `available`; on_leave / maintenance keep
/// their status. Every active booking of the resource is closed.
pub(crate) fn release_in_tx(
    conn: &Connection,
    kind: ResourceKind,
    resource_id: &str,
    actor: &str,
    now: &NaiveDateTime,
) -> RepositoryResult<ReleaseOutcome> {
    let resource = load_resource(conn, kind, resource_id)?
        .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?;
    let was_assigned = resource.status == ResourceStatus::Assigned;
    let now_str = format_ts(now);

    if was_assigned {
        conn.execute(
            "UPDATE resource SET status = 'available', assigned_center_id = NULL, \
             assigned_batch_id = NULL, updated_at = ?1 \
             WHERE resource_kind = ?2 AND resource_id = ?3 AND status = 'assigned'",
            params![now_str, kind.to_db_str(), resource_id],
        )?;
    }

    let closed_bookings = conn.execute(
        "UPDATE booking SET status = 'completed', released_by = ?1, released_at = ?2 \
         WHERE resource_kind = ?3 AND resource_id = ?4 AND status = 'active'",
        params![actor, now_str, kind.to_db_str(), resource_id],
    )?;

    let resource = if was_assigned {
        load_resource(conn, kind, resource_id)?
            .ok_or_else(|| RepositoryError::not_found("Resource", resource_key(kind, resource_id)))?
    } else {
        resource
    };

    Ok(ReleaseOutcome {
        resource,
        was_assigned,
        closed_bookings,
    })
}
