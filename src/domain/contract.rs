// ==========================================
// SkillFlow Ledger - contract (master work order)
// ==========================================
// target_students is set once by head office and never changed by the engine;
// it is the ceiling every allocation check measures against
// ==========================================

use crate::domain::types::ContractStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Contract
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    // ===== identity =====
    pub contract_id: String,
    pub work_order_number: String,

    // ===== descriptive =====
    pub awarding_body: Option<String>,
    pub scheme_name: Option<String>,

    // ===== quotas and plan =====
    pub job_roles: Vec<JobRoleQuota>, // ordered
    pub districts: Vec<DistrictAllocation>,

    // ===== lifecycle =====
    pub status: ContractStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub completed_by: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
}

impl Contract {
    /// Sum of every job-role target
    pub fn total_training_target(&self) -> i64 {
        self.job_roles.iter().map(|r| r.target_students).sum()
    }

    /// Sum of planned centers over all districts
    pub fn planned_center_count(&self) -> i64 {
        self.districts.iter().map(|d| d.planned_center_count).sum()
    }

    pub fn job_role(&self, job_role_id: &str) -> Option<&JobRoleQuota> {
        self.job_roles.iter().find(|r| r.job_role_id == job_role_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }
}

/// Per job role seat quota
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRoleQuota {
    pub job_role_id: String,
    pub job_role_code: String,
    pub job_role_name: String,
    pub target_students: i64,
}

/// Planned centers for one district
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictAllocation {
    pub district_name: String,
    pub planned_center_count: i64,
}

/// Input for creating a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
    pub work_order_number: String,
    #[serde(default)]
    pub awarding_body: Option<String>,
    #[serde(default)]
    pub scheme_name: Option<String>,
    pub job_roles: Vec<JobRoleQuota>,
    #[serde(default)]
    pub districts: Vec<DistrictAllocation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quota(id: &str, target: i64) -> JobRoleQuota {
        JobRoleQuota {
            job_role_id: id.to_string(),
            job_role_code: id.to_uppercase(),
            job_role_name: format!("Role {}", id),
            target_students: target,
        }
    }

    #[test]
    fn test_contract_totals() {
        let contract = Contract {
            contract_id: "C1".to_string(),
            work_order_number: "WO-001".to_string(),
            awarding_body: None,
            scheme_name: None,
            job_roles: vec![quota("jr1", 60), quota("jr2", 40)],
            districts: vec![
                DistrictAllocation {
                    district_name: "North".to_string(),
                    planned_center_count: 2,
                },
                DistrictAllocation {
                    district_name: "South".to_string(),
                    planned_center_count: 3,
                },
            ],
            status: ContractStatus::Active,
            created_by: "ho".to_string(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            completed_by: None,
            completed_at: None,
        };

        assert_eq!(contract.total_training_target(), 100);
        assert_eq!(contract.planned_center_count(), 5);
        assert_eq!(contract.job_role("jr2").map(|r| r.target_students), Some(40));
        assert!(contract.job_role("jr3").is_none());
        assert!(contract.is_active());
    }
}
