// ==========================================
// SkillFlow Ledger - allocation ledger engine
// ==========================================
// Input: contract quotas + live batches (recomputed on every call)
// Output: per job role / contract ledger, allocation decisions
// Rule: remaining = max(0, target - allocated); a request is approved
//       only when requested <= remaining
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::contract::{Contract, JobRoleQuota};
use crate::domain::ledger::{
    AllocationDecision, CenterAllocation, ContractLedger, JobRoleLedger, JobRoleUsage,
};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::instrument;

/// Default decimals for percentages
pub const DEFAULT_PERCENT_DECIMALS: u32 = 1;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ==========================================
// AllocationLedger
// ==========================================
pub struct AllocationLedger {
    percent_decimals: u32,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self {
            percent_decimals: DEFAULT_PERCENT_DECIMALS,
        }
    }

    pub fn with_percent_decimals(percent_decimals: u32) -> Self {
        Self { percent_decimals }
    }

    /// part / whole * 100, rounded; 0 when whole is 0
    pub fn percent(&self, part: i64, whole: i64) -> f64 {
        if whole <= 0 {
            return 0.0;
        }
        round_to(part as f64 / whole as f64 * 100.0, self.percent_decimals)
    }

    /// Ledger line for one job role
    ///
    /// `batches` may hold batches of other job roles; only matching ones count.
    pub fn job_role_ledger(&self, quota: &JobRoleQuota, batches: &[Batch]) -> JobRoleLedger {
        let center_allocations: Vec<CenterAllocation> = batches
            .iter()
            .filter(|b| b.job_role_id == quota.job_role_id)
            .map(|b| CenterAllocation {
                center_id: b.center_id.clone(),
                batch_id: b.batch_id.clone(),
                allocated_students: b.allocated_students,
                status: b.status,
            })
            .collect();

        let allocated: i64 = center_allocations.iter().map(|c| c.allocated_students).sum();
        let remaining = (quota.target_students - allocated).max(0);

        JobRoleLedger {
            job_role_id: quota.job_role_id.clone(),
            job_role_code: quota.job_role_code.clone(),
            job_role_name: quota.job_role_name.clone(),
            total_target: quota.target_students,
            allocated,
            remaining,
            utilization_percent: self.percent(allocated, quota.target_students),
            is_fully_allocated: remaining == 0,
            is_over_allocated: allocated > quota.target_students,
            center_allocations,
        }
    }

    /// Ledger for a contract: one line per job role plus totals
    #[instrument(skip(self, contract, batches), fields(contract_id = %contract.contract_id))]
    pub fn contract_ledger(
        &self,
        contract: &Contract,
        batches: &[Batch],
        generated_at: NaiveDateTime,
    ) -> ContractLedger {
        let job_roles: Vec<JobRoleLedger> = contract
            .job_roles
            .iter()
            .map(|quota| self.job_role_ledger(quota, batches))
            .collect();

        let total_target: i64 = job_roles.iter().map(|r| r.total_target).sum();
        let total_allocated: i64 = job_roles.iter().map(|r| r.allocated).sum();
        let total_remaining: i64 = job_roles.iter().map(|r| r.remaining).sum();

        let centers_opened = batches
            .iter()
            .filter(|b| contract.job_role(&b.job_role_id).is_some())
            .map(|b| b.center_id.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;

        ContractLedger {
            contract_id: contract.contract_id.clone(),
            work_order_number: contract.work_order_number.clone(),
            status: contract.status,
            job_roles,
            total_target,
            total_allocated,
            total_remaining,
            utilization_percent: self.percent(total_allocated, total_target),
            centers_planned: contract.planned_center_count(),
            centers_opened,
            generated_at,
        }
    }

    /// Check `requested` seats against the remaining quota
    ///
    /// `usage.currently_allocated` must already exclude a batch being resized.
    pub fn decide(&self, usage: &JobRoleUsage, requested: i64) -> AllocationDecision {
        let remaining = (usage.total_target - usage.currently_allocated).max(0);
        let approved = requested <= remaining;

        let message = if approved {
            format!(
                "Allocation of {} approved for {}; {} remaining after",
                requested,
                usage.job_role_name,
                remaining - requested
            )
        } else {
            format!(
                "Over-allocation: requested {} but only {} remaining for {}",
                requested, remaining, usage.job_role_name
            )
        };

        AllocationDecision {
            approved,
            contract_id: usage.contract_id.clone(),
            job_role_id: usage.job_role_id.clone(),
            job_role_name: usage.job_role_name.clone(),
            requested,
            total_target: usage.total_target,
            currently_allocated: usage.currently_allocated,
            remaining,
            remaining_after: approved.then(|| remaining - requested),
            message,
        }
    }
}

impl Default for AllocationLedger {
    fn default() -> Self {
        Self::new()
    }
}
