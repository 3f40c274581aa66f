use crate::api::resource_api::parse_resource_kind;
use crate::app::state::AppState;
use crate::domain::resource::LockRequest;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{parse_date_range, run_blocking};

// ==========================================
// Resource locking commands
// ==========================================
// resource_type is parsed inside the blocking task so an unknown type
// surfaces as INVALID_RESOURCE_TYPE like any other API error.

#[derive(Debug, Deserialize)]
pub struct ResourceRefArgs {
    pub resource_type: String,
    pub resource_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListResourcesArgs {
    #[serde(default)]
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnboardResourceArgs {
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetResourceStatusArgs {
    pub resource_type: String,
    pub resource_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckResourceArgs {
    pub resource_type: String,
    pub resource_id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub exclude_center_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LockResourceArgs {
    pub resource_type: String,
    pub resource_id: String,
    pub center_id: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub actor: String,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseResourceArgs {
    pub resource_type: String,
    pub resource_id: String,
    pub actor: String,
}

pub async fn onboard_resource(
    state: Arc<AppState>,
    args: OnboardResourceArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = parse_resource_kind(&args.resource_type)?;
        s.resource_api
            .onboard_resource(kind, args.resource_id, &args.name)
    })
    .await
}

pub async fn set_resource_status(
    state: Arc<AppState>,
    args: SetResourceStatusArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = parse_resource_kind(&args.resource_type)?;
        s.resource_api
            .set_resource_status(kind, &args.resource_id, &args.status)
    })
    .await
}

/// Availability of one resource (read-only)
pub async fn check_resource(state: Arc<AppState>, args: CheckResourceArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = parse_resource_kind(&args.resource_type)?;
        let date_range = parse_date_range(args.start_date.as_deref(), args.end_date.as_deref())?;
        s.resource_api.check_availability(
            kind,
            &args.resource_id,
            date_range.as_ref(),
            args.exclude_center_id.as_deref(),
        )
    })
    .await
}

pub async fn lock_resource(state: Arc<AppState>, args: LockResourceArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let request = LockRequest {
            resource_kind: parse_resource_kind(&args.resource_type)?,
            resource_id: args.resource_id,
            center_id: args.center_id,
            batch_id: args.batch_id,
            date_range: parse_date_range(args.start_date.as_deref(), args.end_date.as_deref())?,
            actor: args.actor,
        };
        s.resource_api.lock_resource(&request)
    })
    .await
}

pub async fn release_resource(
    state: Arc<AppState>,
    args: ReleaseResourceArgs,
) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = parse_resource_kind(&args.resource_type)?;
        s.resource_api
            .release_resource(kind, &args.resource_id, &args.actor)
    })
    .await
}

/// Booking history, newest first
pub async fn resource_history(state: Arc<AppState>, args: ResourceRefArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = parse_resource_kind(&args.resource_type)?;
        s.resource_api.booking_history(kind, &args.resource_id)
    })
    .await
}

pub async fn list_resources(state: Arc<AppState>, args: ListResourcesArgs) -> Result<String, String> {
    run_blocking(&state, move |s| {
        let kind = match args.resource_type.as_deref() {
            Some(raw) => Some(parse_resource_kind(raw)?),
            None => None,
        };
        s.resource_api.list_resources(kind)
    })
    .await
}

pub async fn resource_summary(state: Arc<AppState>) -> Result<String, String> {
    run_blocking(&state, |s| s.resource_api.summary()).await
}
