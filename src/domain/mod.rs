// ==========================================
// SkillFlow Ledger - domain layer
// ==========================================
// Entities, enums and derived views
// No data access, no rule evaluation
// ==========================================

pub mod batch;
pub mod burndown;
pub mod contract;
pub mod ledger;
pub mod resource;
pub mod types;

pub use batch::{AllocationEntry, Batch, NewBatch, StageProgress};
pub use burndown::{
    BurndownOverall, BurndownReport, BurndownSummary, ContractBurndown, PipelineSnapshot,
    StageCounts,
};
pub use contract::{Contract, DistrictAllocation, JobRoleQuota, NewContract};
pub use ledger::{
    AllocationCommit, AllocationDecision, CenterAllocation, ContractLedger, JobRoleLedger,
    JobRoleUsage,
};
pub use resource::{
    Availability, Booking, ConflictReason, DateRange, LockOutcome, LockRequest, ReleaseOutcome,
    Resource, ResourceHolder, ResourceKindSummary,
};
pub use types::{
    BatchStatus, BookingStatus, ContractStatus, EntryStatus, PipelineStage, ResourceKind,
    ResourceStatus,
};
