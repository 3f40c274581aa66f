// ==========================================
// SkillFlow Ledger - core library
// ==========================================
// Allocation ledger and resource locking engine for skill-training contracts
// Stack: Rust + SQLite (rusqlite) + tracing
// Engine of record: seat quotas are never exceeded, resources are never
// double-booked; humans decide everything else
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain - entities and types
pub mod domain;

// Repository - data access
pub mod repository;

// Engine - business rules
pub mod engine;

// Configuration
pub mod config;

// Database infrastructure (connection setup, PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API - business operations
pub mod api;

// App - state wiring and JSON commands
pub mod app;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{
    BatchStatus, BookingStatus, ContractStatus, EntryStatus, PipelineStage, ResourceKind,
    ResourceStatus,
};

// Domain entities
pub use domain::{
    AllocationDecision, AllocationEntry, Availability, Batch, Booking, BurndownReport, Contract,
    ContractBurndown, ContractLedger, DateRange, JobRoleQuota, Resource,
};

// Engines
pub use engine::{AllocationLedger, BurndownAggregator, ResourceLockEvaluator};

// API
pub use api::{ApiError, BurndownApi, ContractApi, LedgerApi, ProvisioningApi, ResourceApi};

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Display name
pub const APP_NAME: &str = "SkillFlow Allocation Ledger";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
