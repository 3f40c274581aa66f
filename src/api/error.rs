// ==========================================
// SkillFlow Ledger - API errors
// ==========================================
// Maps repository failures onto the operator-facing taxonomy:
// NotFound / OverAllocation / ResourceConflict / InvalidResourceType
// None of these are retried automatically; they are business decisions
// ==========================================

use crate::domain::resource::{Booking, ConflictReason, ResourceHolder};
use crate::domain::types::ResourceKind;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer error
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Engine taxonomy
    // ==========================================
    #[error("not found: {0}")]
    NotFound(String),

    /// Requested seats exceed the job role's remaining quota
    #[error(
        "Over-allocation: requested {requested} but only {remaining} remaining for {job_role_name}"
    )]
    OverAllocation {
        contract_id: String,
        job_role_id: String,
        job_role_name: String,
        requested: i64,
        remaining: i64,
        total_target: i64,
        currently_allocated: i64,
    },

    /// Double-booking attempt; carries the competing holder
    #[error("{resource_kind} {resource_id} is {}{}", .reason.describe(), holder_suffix(.holder))]
    ResourceConflict {
        resource_kind: ResourceKind,
        resource_id: String,
        reason: ConflictReason,
        holder: Option<ResourceHolder>,
        conflicting_bookings: Vec<Booking>,
    },

    #[error("invalid resource type: {0} (expected trainer, manager or infrastructure)")]
    InvalidResourceType(String),

    // ==========================================
    // Business rules
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("invalid state transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // Data access
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    // ==========================================
    // Generic
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn holder_suffix(holder: &Option<ResourceHolder>) -> String {
    match holder {
        Some(ResourceHolder {
            center_id,
            batch_id: Some(batch_id),
        }) => format!(" (held by center {} batch {})", center_id, batch_id),
        Some(ResourceHolder { center_id, .. }) => format!(" (held by center {})", center_id),
        None => String::new(),
    }
}

impl ApiError {
    /// HTTP-like status for any RPC/HTTP framing
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidInput(_)
            | ApiError::InvalidResourceType(_)
            | ApiError::ValidationError(_) => 400,
            ApiError::ResourceConflict { .. } | ApiError::InvalidStateTransition { .. } => 409,
            ApiError::OverAllocation { .. } | ApiError::BusinessRuleViolation(_) => 422,
            _ => 500,
        }
    }
}

// ==========================================
// From RepositoryError
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("database lock poisoned: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("duplicate record: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("missing referenced record: {}", msg))
            }
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;
