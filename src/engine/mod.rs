// ==========================================
// SkillFlow Ledger - engine layer
// ==========================================
// Pure rule code: quota arithmetic, availability, pipeline derivation
// Rule: engines never build SQL and never touch a connection
// ==========================================

pub mod allocation_ledger;
pub mod burndown;
pub mod resource_lock;

pub use allocation_ledger::{round_to, AllocationLedger};
pub use burndown::BurndownAggregator;
pub use resource_lock::{ranges_overlap, ResourceLockEvaluator};
