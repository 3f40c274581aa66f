// ==========================================
// SkillFlow Ledger - API layer
// ==========================================
// Business operations behind the command surface
// ==========================================

pub mod burndown_api;
pub mod contract_api;
pub mod error;
pub mod ledger_api;
pub mod provisioning_api;
pub mod resource_api;

// Re-exports
pub use burndown_api::BurndownApi;
pub use contract_api::ContractApi;
pub use error::{ApiError, ApiResult};
pub use ledger_api::{AllocationReceipt, LedgerApi};
pub use provisioning_api::{OpenCenterRequest, OpenCenterResult, ProvisioningApi};
pub use resource_api::{parse_resource_kind, LockReceipt, ResourceApi};
