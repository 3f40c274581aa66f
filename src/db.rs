// ==========================================
// SkillFlow Ledger - SQLite connection setup
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs (foreign keys on everywhere)
// - one busy_timeout for all connections so concurrent writers wait instead of failing
// - one idempotent schema bootstrap shared by the app, the seeding binary and tests
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version this build expects
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the shared PRAGMAs to a connection
///
/// Both settings are per connection:
/// - foreign_keys must be switched on for each connection
/// - busy_timeout must be configured for each connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared configuration applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create every table the engine uses (idempotent) and stamp the schema version
///
/// Resource rows carry a CHECK that keeps `status = 'assigned'` and a non-null
/// `assigned_center_id` in lockstep, so no write path can break that pairing.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS contract (
    contract_id TEXT PRIMARY KEY,
    work_order_number TEXT NOT NULL UNIQUE,
    awarding_body TEXT,
    scheme_name TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    completed_by TEXT,
    completed_at TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS contract_job_role (
    contract_id TEXT NOT NULL REFERENCES contract(contract_id),
    job_role_id TEXT NOT NULL,
    job_role_code TEXT NOT NULL,
    job_role_name TEXT NOT NULL,
    target_students INTEGER NOT NULL CHECK (target_students >= 0),
    seq_no INTEGER NOT NULL,
    PRIMARY KEY (contract_id, job_role_id)
);

CREATE TABLE IF NOT EXISTS contract_district (
    contract_id TEXT NOT NULL REFERENCES contract(contract_id),
    district_name TEXT NOT NULL,
    planned_center_count INTEGER NOT NULL DEFAULT 0 CHECK (planned_center_count >= 0),
    seq_no INTEGER NOT NULL,
    PRIMARY KEY (contract_id, district_name)
);

CREATE TABLE IF NOT EXISTS batch (
    batch_id TEXT PRIMARY KEY,
    contract_id TEXT NOT NULL REFERENCES contract(contract_id),
    job_role_id TEXT NOT NULL,
    center_id TEXT NOT NULL,
    allocated_students INTEGER NOT NULL CHECK (allocated_students >= 0),
    status TEXT NOT NULL DEFAULT 'active',
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (contract_id, job_role_id)
        REFERENCES contract_job_role(contract_id, job_role_id)
);

CREATE INDEX IF NOT EXISTS idx_batch_contract_role ON batch(contract_id, job_role_id);

CREATE TABLE IF NOT EXISTS allocation_entry (
    entry_id TEXT PRIMARY KEY,
    contract_id TEXT NOT NULL REFERENCES contract(contract_id),
    job_role_id TEXT NOT NULL,
    center_id TEXT NOT NULL,
    batch_id TEXT NOT NULL REFERENCES batch(batch_id),
    allocated_students INTEGER NOT NULL CHECK (allocated_students >= 0),
    status TEXT NOT NULL DEFAULT 'active',
    allocated_by TEXT NOT NULL,
    allocated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_allocation_entry_contract ON allocation_entry(contract_id, job_role_id);

CREATE TABLE IF NOT EXISTS resource (
    resource_kind TEXT NOT NULL,
    resource_id TEXT NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'available',
    assigned_center_id TEXT,
    assigned_batch_id TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (resource_kind, resource_id),
    CHECK ((status = 'assigned') = (assigned_center_id IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS booking (
    booking_id TEXT PRIMARY KEY,
    resource_kind TEXT NOT NULL,
    resource_id TEXT NOT NULL,
    center_id TEXT NOT NULL,
    batch_id TEXT,
    start_date TEXT,
    end_date TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    locked_by TEXT NOT NULL,
    locked_at TEXT NOT NULL,
    released_by TEXT,
    released_at TEXT,
    FOREIGN KEY (resource_kind, resource_id) REFERENCES resource(resource_kind, resource_id),
    CHECK (start_date IS NULL OR end_date IS NULL OR start_date <= end_date)
);

CREATE INDEX IF NOT EXISTS idx_booking_resource ON booking(resource_kind, resource_id, status);
CREATE INDEX IF NOT EXISTS idx_booking_batch ON booking(batch_id, status);

CREATE TABLE IF NOT EXISTS stage_progress (
    batch_id TEXT NOT NULL REFERENCES batch(batch_id),
    stage TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0 CHECK (completed >= 0),
    updated_at TEXT NOT NULL,
    PRIMARY KEY (batch_id, stage)
);
"#;
