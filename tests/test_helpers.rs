// ==========================================
// Test helpers
// ==========================================
// Temporary databases, AppState wiring and seed builders
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use skillflow_ledger::app::AppState;
use skillflow_ledger::db::{init_schema, open_sqlite_connection};
use skillflow_ledger::logging;
use skillflow_ledger::domain::{Contract, JobRoleQuota, NewContract, Resource};
use skillflow_ledger::ResourceKind;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub const ACTOR: &str = "tester";

/// Create a temporary database with the full schema
///
/// # Returns
/// - NamedTempFile: the temporary file (keep it alive for the test)
/// - String: database file path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    logging::init_test();
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// AppState on a fresh temporary database
pub fn create_test_state() -> (NamedTempFile, Arc<AppState>) {
    let (temp_file, db_path) = create_test_db().expect("create test db");
    let state = AppState::new(db_path).expect("create AppState");
    (temp_file, Arc::new(state))
}

/// A separate shared connection on the same database file
pub fn open_shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).expect("open connection");
    Arc::new(Mutex::new(conn))
}

pub fn job_role(id: &str, name: &str, target: i64) -> JobRoleQuota {
    JobRoleQuota {
        job_role_id: id.to_string(),
        job_role_code: id.to_uppercase(),
        job_role_name: name.to_string(),
        target_students: target,
    }
}

/// Create an active contract with the given (job role id, target) pairs
///
/// Job role names are "Role <id>".
pub fn seed_contract(state: &AppState, work_order_number: &str, roles: &[(&str, i64)]) -> Contract {
    let input = NewContract {
        work_order_number: work_order_number.to_string(),
        awarding_body: Some("Skill Mission".to_string()),
        scheme_name: Some("Demo Scheme".to_string()),
        job_roles: roles
            .iter()
            .map(|(id, target)| job_role(id, &format!("Role {}", id), *target))
            .collect(),
        districts: vec![],
    };
    state
        .contract_api
        .create_contract(input, ACTOR)
        .expect("create contract")
}

pub fn seed_resource(state: &AppState, kind: ResourceKind, resource_id: &str) -> Resource {
    state
        .resource_api
        .onboard_resource(kind, Some(resource_id.to_string()), &format!("{} {}", kind, resource_id))
        .expect("onboard resource")
}
