// ==========================================
// SkillFlow Ledger - engine settings snapshot
// ==========================================

use serde::{Deserialize, Serialize};

pub const DEFAULT_BOOKING_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_PERCENT_DECIMALS: u32 = 1;
pub const MAX_PERCENT_DECIMALS: u32 = 4;

/// Typed view of the `config_kv` keys the engine reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Max rows returned by booking history
    pub booking_history_limit: usize,

    /// Decimals kept on utilization / completion percentages
    pub percent_decimals: u32,

    /// Whether opening a center must supply a date range for its locks
    pub require_date_range: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            booking_history_limit: DEFAULT_BOOKING_HISTORY_LIMIT,
            percent_decimals: DEFAULT_PERCENT_DECIMALS,
            require_date_range: false,
        }
    }
}
