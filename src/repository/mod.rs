// ==========================================
// SkillFlow Ledger - repository layer
// ==========================================
// Rule: repositories map rows, they do not decide business outcomes.
// Check-then-act writes take the decision as a closure and run it inside
// their own transaction.
// Every query is parameterised.
// ==========================================

pub mod allocation_repo;
pub mod batch_repo;
pub mod contract_repo;
pub mod error;
pub mod resource_repo;
pub mod stage_progress_repo;
mod row_codec;

pub use allocation_repo::AllocationRepository;
pub use batch_repo::BatchRepository;
pub use contract_repo::{ContractCompletion, ContractRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use resource_repo::ResourceRepository;
pub use stage_progress_repo::StageProgressRepository;
