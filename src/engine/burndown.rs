// ==========================================
// SkillFlow Ledger - burn-down aggregator
// ==========================================
// Input: contract target + ledger allocation + cumulative stage counts
// Output: eight-point pipeline snapshot per contract and overall totals
// Rule: every derived bucket is clamped at zero so partial or out-of-order
//       stage updates upstream never produce negative counts
// Read-only report: never a source for allocation decisions
// ==========================================

use crate::domain::batch::{Batch, StageProgress};
use crate::domain::burndown::{
    BurndownOverall, BurndownReport, BurndownSummary, ContractBurndown, PipelineSnapshot,
    StageCounts,
};
use crate::domain::contract::Contract;
use crate::engine::allocation_ledger::AllocationLedger;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::instrument;

fn gap(upstream: i64, downstream: i64) -> i64 {
    (upstream - downstream).max(0)
}

// ==========================================
// BurndownAggregator
// ==========================================
pub struct BurndownAggregator {
    ledger: AllocationLedger,
}

impl BurndownAggregator {
    pub fn new() -> Self {
        Self {
            ledger: AllocationLedger::new(),
        }
    }

    pub fn with_percent_decimals(percent_decimals: u32) -> Self {
        Self {
            ledger: AllocationLedger::with_percent_decimals(percent_decimals),
        }
    }

    /// Pairwise subtraction of adjacent cumulative counts
    pub fn derive_pipeline(&self, target: i64, allocated: i64, counts: &StageCounts) -> PipelineSnapshot {
        PipelineSnapshot {
            unallocated: gap(target, allocated),
            allocated_not_started: gap(allocated, counts.mobilized),
            mobilized: counts.mobilized.max(0),
            awaiting_training: gap(counts.mobilized, counts.training),
            in_training: gap(counts.training, counts.ojt),
            in_ojt: gap(counts.ojt, counts.assessed),
            awaiting_placement: gap(counts.assessed, counts.placed),
            placed: counts.placed.max(0),
        }
    }

    /// Burn-down for one contract
    ///
    /// # Arguments
    /// - `batches`: live batches of the contract
    /// - `progress`: stage rows; rows of batches not in `batches` are ignored
    #[instrument(skip(self, contract, batches, progress), fields(contract_id = %contract.contract_id))]
    pub fn contract_burndown(
        &self,
        contract: &Contract,
        batches: &[Batch],
        progress: &[StageProgress],
        generated_at: NaiveDateTime,
    ) -> ContractBurndown {
        let ledger = self.ledger.contract_ledger(contract, batches, generated_at);

        let batch_ids: HashSet<&str> = batches.iter().map(|b| b.batch_id.as_str()).collect();
        let mut counts = StageCounts::default();
        for row in progress.iter().filter(|p| batch_ids.contains(p.batch_id.as_str())) {
            counts.add(row.stage, row.completed);
        }

        let pipeline = self.derive_pipeline(ledger.total_target, ledger.total_allocated, &counts);

        ContractBurndown {
            contract_id: contract.contract_id.clone(),
            work_order_number: contract.work_order_number.clone(),
            awarding_body: contract.awarding_body.clone(),
            scheme_name: contract.scheme_name.clone(),
            status: contract.status,
            centers_count: ledger.centers_opened,
            pipeline,
            summary: BurndownSummary {
                total_target: ledger.total_target,
                total_allocated: ledger.total_allocated,
                total_mobilized: counts.mobilized,
                total_placed: counts.placed,
                completion_percent: self.ledger.percent(counts.placed, ledger.total_target),
            },
        }
    }

    /// Combine per-contract burn-downs with overall totals
    pub fn report(&self, contracts: Vec<ContractBurndown>, generated_at: NaiveDateTime) -> BurndownReport {
        let total_target: i64 = contracts.iter().map(|c| c.summary.total_target).sum();
        let total_placed: i64 = contracts.iter().map(|c| c.summary.total_placed).sum();

        let overall = BurndownOverall {
            total_contracts: contracts.len() as i64,
            total_target,
            total_allocated: contracts.iter().map(|c| c.summary.total_allocated).sum(),
            total_mobilized: contracts.iter().map(|c| c.summary.total_mobilized).sum(),
            total_placed,
            total_unallocated: contracts.iter().map(|c| c.pipeline.unallocated).sum(),
            overall_completion: self.ledger.percent(total_placed, total_target),
        };

        BurndownReport {
            contracts,
            overall,
            generated_at,
        }
    }
}

impl Default for BurndownAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::JobRoleQuota;
    use crate::domain::types::{BatchStatus, ContractStatus, PipelineStage};
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn counts(mobilized: i64, training: i64, ojt: i64, assessed: i64, placed: i64) -> StageCounts {
        StageCounts {
            mobilized,
            training,
            ojt,
            assessed,
            placed,
        }
    }

    #[test]
    fn test_pipeline_pairwise_subtraction() {
        let agg = BurndownAggregator::new();
        let snapshot = agg.derive_pipeline(100, 80, &counts(50, 30, 0, 0, 0));

        assert_eq!(snapshot.unallocated, 20);
        assert_eq!(snapshot.allocated_not_started, 30);
        assert_eq!(snapshot.mobilized, 50);
        assert_eq!(snapshot.awaiting_training, 20);
        assert_eq!(snapshot.in_training, 30);
        assert_eq!(snapshot.placed, 0);
    }

    #[test]
    fn test_inconsistent_stage_data_clamps_to_zero() {
        let agg = BurndownAggregator::new();
        // training reported ahead of mobilization, placement ahead of assessment
        let snapshot = agg.derive_pipeline(100, 120, &counts(30, 45, 10, 5, 8));

        assert_eq!(snapshot.unallocated, 0);
        assert_eq!(snapshot.awaiting_training, 0);
        assert_eq!(snapshot.awaiting_placement, 0);
        assert!(snapshot.as_ordered().iter().all(|v| *v >= 0));
    }

    #[test]
    fn test_contract_burndown_and_report() {
        let agg = BurndownAggregator::new();
        let contract = Contract {
            contract_id: "C1".to_string(),
            work_order_number: "WO-1".to_string(),
            awarding_body: Some("State Mission".to_string()),
            scheme_name: None,
            job_roles: vec![JobRoleQuota {
                job_role_id: "jr1".to_string(),
                job_role_code: "SEW".to_string(),
                job_role_name: "Sewing Operator".to_string(),
                target_students: 100,
            }],
            districts: vec![],
            status: ContractStatus::Active,
            created_by: "ho".to_string(),
            created_at: ts(),
            completed_by: None,
            completed_at: None,
        };
        let batches: Vec<Batch> = [("B1", "CTR1", 50), ("B2", "CTR2", 30)]
            .iter()
            .map(|(id, center, n)| Batch {
                batch_id: id.to_string(),
                contract_id: "C1".to_string(),
                job_role_id: "jr1".to_string(),
                center_id: center.to_string(),
                allocated_students: *n,
                status: BatchStatus::Active,
                created_by: "ops".to_string(),
                created_at: ts(),
                updated_at: ts(),
            })
            .collect();
        let progress = vec![
            StageProgress {
                batch_id: "B1".to_string(),
                stage: PipelineStage::Mobilization,
                completed: 40,
                updated_at: ts(),
            },
            StageProgress {
                batch_id: "B2".to_string(),
                stage: PipelineStage::Mobilization,
                completed: 10,
                updated_at: ts(),
            },
            StageProgress {
                batch_id: "B1".to_string(),
                stage: PipelineStage::Placement,
                completed: 25,
                updated_at: ts(),
            },
            StageProgress {
                batch_id: "OTHER".to_string(),
                stage: PipelineStage::Placement,
                completed: 99,
                updated_at: ts(),
            },
        ];

        let burndown = agg.contract_burndown(&contract, &batches, &progress, ts());
        assert_eq!(burndown.centers_count, 2);
        assert_eq!(burndown.summary.total_allocated, 80);
        assert_eq!(burndown.summary.total_mobilized, 50);
        assert_eq!(burndown.summary.total_placed, 25);
        assert_eq!(burndown.summary.completion_percent, 25.0);
        assert_eq!(burndown.pipeline.unallocated, 20);
        assert_eq!(burndown.pipeline.allocated_not_started, 30);

        let report = agg.report(vec![burndown], ts());
        assert_eq!(report.overall.total_contracts, 1);
        assert_eq!(report.overall.total_unallocated, 20);
        assert_eq!(report.overall.overall_completion, 25.0);
    }

    #[test]
    fn test_zero_target_completion_is_zero() {
        let agg = BurndownAggregator::new();
        let report = agg.report(vec![], ts());
        assert_eq!(report.overall.total_contracts, 0);
        assert_eq!(report.overall.overall_completion, 0.0);
    }
}
