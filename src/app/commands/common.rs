use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::domain::resource::DateRange;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// Shared helpers: error mapping, payload and date parsing
// ==========================================

/// Error response returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine code
    pub code: String,

    /// HTTP-like status
    pub status: u16,

    /// Human readable message
    pub message: String,

    /// Structured detail (optional)
    pub details: Option<serde_json::Value>,
}

/// Serialize an ApiError into the JSON error string
pub(crate) fn map_api_error(err: ApiError) -> String {
    let error_response = ErrorResponse {
        code: match &err {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::OverAllocation { .. } => "OVER_ALLOCATION",
            ApiError::ResourceConflict { .. } => "RESOURCE_CONFLICT",
            ApiError::InvalidResourceType(_) => "INVALID_RESOURCE_TYPE",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
        .to_string(),
        status: err.status_code(),
        message: err.to_string(),
        details: match &err {
            ApiError::OverAllocation {
                contract_id,
                job_role_id,
                job_role_name,
                requested,
                remaining,
                total_target,
                currently_allocated,
            } => Some(serde_json::json!({
                "contract_id": contract_id,
                "job_role_id": job_role_id,
                "job_role_name": job_role_name,
                "requested": requested,
                "remaining": remaining,
                "total_target": total_target,
                "currently_allocated": currently_allocated,
            })),
            ApiError::ResourceConflict {
                resource_kind,
                resource_id,
                reason,
                holder,
                conflicting_bookings,
            } => Some(serde_json::json!({
                "resource_kind": resource_kind,
                "resource_id": resource_id,
                "reason": reason,
                "holder": holder,
                "conflicting_bookings": conflicting_bookings,
            })),
            ApiError::InvalidStateTransition { from, to } => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            _ => None,
        },
    };

    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

/// Decode a command payload into its argument struct
pub(crate) fn parse_args<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(payload)
        .map_err(|e| map_api_error(ApiError::InvalidInput(format!("bad payload: {}", e))))
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(field: &str, date_str: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
        ApiError::InvalidInput(format!("{} must be YYYY-MM-DD: {}", field, e))
    })
}

/// Parse an optional start/end pair; both or neither must be given
pub(crate) fn parse_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> ApiResult<Option<DateRange>> {
    match (start_date, end_date) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let start = parse_date("start_date", start)?;
            let end = parse_date("end_date", end)?;
            DateRange::new(start, end)
                .map(Some)
                .map_err(ApiError::InvalidInput)
        }
        _ => Err(ApiError::InvalidInput(
            "start_date and end_date must be given together".to_string(),
        )),
    }
}

/// Run a blocking API call off the async runtime and serialize its result
pub(crate) async fn run_blocking<T, F>(state: &Arc<AppState>, call: F) -> Result<String, String>
where
    F: FnOnce(&AppState) -> ApiResult<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || call(&state))
        .await
        .map_err(|e| map_api_error(ApiError::InternalError(format!("command task failed: {}", e))))?;

    let value = result.map_err(map_api_error)?;
    serde_json::to_string(&value).map_err(|e| format!("serialization failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_carries_code_and_status() {
        let raw = map_api_error(ApiError::NotFound("Contract(id=X)".to_string()));
        let response: ErrorResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.status, 404);
        assert!(response.details.is_none());
    }

    #[test]
    fn test_parse_date_range() {
        assert!(parse_date_range(None, None).unwrap().is_none());
        let range = parse_date_range(Some("2025-01-01"), Some("2025-01-31"))
            .unwrap()
            .unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(parse_date_range(Some("2025-01-01"), None).is_err());
        assert!(parse_date_range(Some("2025-02-01"), Some("2025-01-01")).is_err());
        assert!(parse_date_range(Some("01/02/2025"), Some("2025-01-01")).is_err());
    }
}
