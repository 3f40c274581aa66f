// ==========================================
// SkillFlow Ledger - domain enums
// ==========================================
// Stored as lowercase snake_case text, the same spelling used on the wire
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Resource kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Trainer,
    Manager,        // center manager
    Infrastructure, // classroom / lab unit
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Trainer,
        ResourceKind::Manager,
        ResourceKind::Infrastructure,
    ];

    /// Parse the wire/db spelling; None for unknown kinds
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trainer" => Some(ResourceKind::Trainer),
            "manager" => Some(ResourceKind::Manager),
            "infrastructure" => Some(ResourceKind::Infrastructure),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResourceKind::Trainer => "trainer",
            ResourceKind::Manager => "manager",
            ResourceKind::Infrastructure => "infrastructure",
        }
    }

    /// Managers are bound to a center only; the other kinds also record the batch.
    pub fn binds_batch(&self) -> bool {
        !matches!(self, ResourceKind::Manager)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Resource status
// ==========================================
// available -> (lock) -> assigned -> (release) -> available
// on_leave / maintenance are operator-set and block locking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Available,
    Assigned,
    OnLeave,
    Maintenance,
}

impl ResourceStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(ResourceStatus::Available),
            "assigned" => Some(ResourceStatus::Assigned),
            "on_leave" => Some(ResourceStatus::OnLeave),
            "maintenance" => Some(ResourceStatus::Maintenance),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Assigned => "assigned",
            ResourceStatus::OnLeave => "on_leave",
            ResourceStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Booking status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    Completed,
}

impl BookingStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(BookingStatus::Active),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
        }
    }
}

// ==========================================
// Contract / batch lifecycle
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Completed,
}

impl ContractStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(ContractStatus::Active),
            "completed" => Some(ContractStatus::Completed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Completed,
}

impl BatchStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(BatchStatus::Active),
            "completed" => Some(BatchStatus::Completed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Completed => "completed",
        }
    }
}

// ==========================================
// Allocation entry status
// ==========================================
// superseded: replaced by a later entry after a batch resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Active,
    Superseded,
}

impl EntryStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(EntryStatus::Active),
            "superseded" => Some(EntryStatus::Superseded),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Superseded => "superseded",
        }
    }
}

// ==========================================
// Pipeline stage
// ==========================================
// Fixed order: mobilization -> training -> ojt -> assessment -> placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Mobilization,
    Training,
    Ojt,
    Assessment,
    Placement,
}

impl PipelineStage {
    pub const ORDERED: [PipelineStage; 5] = [
        PipelineStage::Mobilization,
        PipelineStage::Training,
        PipelineStage::Ojt,
        PipelineStage::Assessment,
        PipelineStage::Placement,
    ];

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mobilization" => Some(PipelineStage::Mobilization),
            "training" => Some(PipelineStage::Training),
            "ojt" => Some(PipelineStage::Ojt),
            "assessment" => Some(PipelineStage::Assessment),
            "placement" => Some(PipelineStage::Placement),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PipelineStage::Mobilization => "mobilization",
            PipelineStage::Training => "training",
            PipelineStage::Ojt => "ojt",
            PipelineStage::Assessment => "assessment",
            PipelineStage::Placement => "placement",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_parsing() {
        assert_eq!(ResourceKind::from_db_str("trainer"), Some(ResourceKind::Trainer));
        assert_eq!(ResourceKind::from_db_str(" Manager "), Some(ResourceKind::Manager));
        assert_eq!(
            ResourceKind::from_db_str("infrastructure"),
            Some(ResourceKind::Infrastructure)
        );
        assert_eq!(ResourceKind::from_db_str("projector"), None);
    }

    #[test]
    fn test_manager_does_not_bind_batch() {
        assert!(ResourceKind::Trainer.binds_batch());
        assert!(ResourceKind::Infrastructure.binds_batch());
        assert!(!ResourceKind::Manager.binds_batch());
    }

    #[test]
    fn test_status_serde_matches_db_spelling() {
        let json = serde_json::to_string(&ResourceStatus::OnLeave).unwrap();
        assert_eq!(json, "\"on_leave\"");
        assert_eq!(ResourceStatus::OnLeave.to_db_str(), "on_leave");

        for stage in PipelineStage::ORDERED {
            assert_eq!(PipelineStage::from_db_str(stage.to_db_str()), Some(stage));
        }
    }
}
