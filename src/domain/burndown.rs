// ==========================================
// SkillFlow Ledger - burn-down views (derived, never persisted)
// ==========================================

use crate::domain::types::{ContractStatus, PipelineStage};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cumulative completed counts per stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub mobilized: i64,
    pub training: i64,
    pub ojt: i64,
    pub assessed: i64,
    pub placed: i64,
}

impl StageCounts {
    pub fn add(&mut self, stage: PipelineStage, completed: i64) {
        match stage {
            PipelineStage::Mobilization => self.mobilized += completed,
            PipelineStage::Training => self.training += completed,
            PipelineStage::Ojt => self.ojt += completed,
            PipelineStage::Assessment => self.assessed += completed,
            PipelineStage::Placement => self.placed += completed,
        }
    }
}

/// Students at each of the eight ordered pipeline points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub unallocated: i64,
    pub allocated_not_started: i64,
    pub mobilized: i64,
    pub awaiting_training: i64,
    pub in_training: i64,
    pub in_ojt: i64,
    pub awaiting_placement: i64,
    pub placed: i64,
}

impl PipelineSnapshot {
    pub const POINTS: [&'static str; 8] = [
        "unallocated",
        "allocated_not_started",
        "mobilized",
        "awaiting_training",
        "in_training",
        "in_ojt",
        "awaiting_placement",
        "placed",
    ];

    pub fn as_ordered(&self) -> [i64; 8] {
        [
            self.unallocated,
            self.allocated_not_started,
            self.mobilized,
            self.awaiting_training,
            self.in_training,
            self.in_ojt,
            self.awaiting_placement,
            self.placed,
        ]
    }

    /// Students at or beyond each point (suffix sums of `as_ordered`)
    pub fn at_or_beyond(&self) -> [i64; 8] {
        let points = self.as_ordered();
        let mut out = [0i64; 8];
        let mut running = 0;
        for i in (0..8).rev() {
            running += points[i];
            out[i] = running;
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownSummary {
    pub total_target: i64,
    pub total_allocated: i64,
    pub total_mobilized: i64,
    pub total_placed: i64,
    pub completion_percent: f64,
}

/// Burn-down for one contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractBurndown {
    pub contract_id: String,
    pub work_order_number: String,
    pub awarding_body: Option<String>,
    pub scheme_name: Option<String>,
    pub status: ContractStatus,
    pub centers_count: i64,
    pub pipeline: PipelineSnapshot,
    pub summary: BurndownSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownOverall {
    pub total_contracts: i64,
    pub total_target: i64,
    pub total_allocated: i64,
    pub total_mobilized: i64,
    pub total_placed: i64,
    pub total_unallocated: i64,
    pub overall_completion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurndownReport {
    pub contracts: Vec<ContractBurndown>,
    pub overall: BurndownOverall,
    pub generated_at: NaiveDateTime,
}
