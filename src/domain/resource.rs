// ==========================================
// SkillFlow Ledger - resources and bookings
// ==========================================
// Resource.status is the real-time gate; the booking log carries date ranges
// and history. Both are written in the same transaction.
// ==========================================

use crate::domain::types::{BookingStatus, ResourceKind, ResourceStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DateRange - inclusive [start, end]
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting end < start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!(
                "end date {} is before start date {}",
                end.format("%Y-%m-%d"),
                start.format("%Y-%m-%d")
            ));
        }
        Ok(Self { start, end })
    }
}

// ==========================================
// Resource
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub name: String,
    pub status: ResourceStatus,
    pub assigned_center_id: Option<String>,
    pub assigned_batch_id: Option<String>, // always None for managers
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resource {
    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }

    /// Current holder, if assigned
    pub fn holder(&self) -> Option<ResourceHolder> {
        self.assigned_center_id
            .as_ref()
            .map(|center_id| ResourceHolder {
                center_id: center_id.clone(),
                batch_id: self.assigned_batch_id.clone(),
            })
    }
}

/// Identity of the center/batch currently holding a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHolder {
    pub center_id: String,
    pub batch_id: Option<String>,
}

// ==========================================
// Booking - one lock event
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub center_id: String,
    pub batch_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub status: BookingStatus,
    pub locked_by: String,
    pub locked_at: NaiveDateTime,
    pub released_by: Option<String>,
    pub released_at: Option<NaiveDateTime>,
}

// ==========================================
// Availability
// ==========================================

/// Why a resource cannot be handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    AlreadyAssigned,
    OnLeave,
    Maintenance,
    BookingOverlap,
}

impl ConflictReason {
    /// Reason implied by a non-available status
    pub fn from_status(status: ResourceStatus) -> Option<Self> {
        match status {
            ResourceStatus::Available => None,
            ResourceStatus::Assigned => Some(ConflictReason::AlreadyAssigned),
            ResourceStatus::OnLeave => Some(ConflictReason::OnLeave),
            ResourceStatus::Maintenance => Some(ConflictReason::Maintenance),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyAssigned => "already assigned",
            ConflictReason::OnLeave => "on leave",
            ConflictReason::Maintenance => "under maintenance",
            ConflictReason::BookingOverlap => "booked for an overlapping date range",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum Availability {
    Available,
    NotAvailable {
        reason: ConflictReason,
        holder: Option<ResourceHolder>,
        conflicting_bookings: Vec<Booking>,
    },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

// ==========================================
// Lock / release
// ==========================================

/// Lock request for one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRequest {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub center_id: String,
    pub batch_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub actor: String,
}

/// Result of an atomic lock attempt
#[derive(Debug, Clone)]
pub enum LockOutcome {
    Locked { resource: Resource, booking: Booking },
    Rejected(Availability),
}

/// Result of a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub resource: Resource,
    pub was_assigned: bool,
    pub closed_bookings: usize,
}

/// Counts by status for one resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKindSummary {
    pub total: i64,
    pub available: i64,
    pub assigned: i64,
    pub on_leave: i64,
    pub maintenance: i64,
}
