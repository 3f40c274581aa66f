// ==========================================
// SkillFlow Ledger - demo database seeding
// ==========================================
// Usage: seed_demo_db [db-path]
// An existing file is backed up (<path>.bak.<timestamp>) and replaced.
// Everything is written through the API layer, so the seeded data obeys
// the same quota and locking rules as production writes.
// ==========================================

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use std::fs;
use std::path::Path;

use skillflow_ledger::api::OpenCenterRequest;
use skillflow_ledger::app::{get_default_db_path, AppState};
use skillflow_ledger::domain::{DateRange, DistrictAllocation, JobRoleQuota, NewContract};
use skillflow_ledger::ResourceKind;

const ACTOR: &str = "seed";

fn main() -> Result<()> {
    skillflow_ledger::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone()).map_err(anyhow::Error::msg)?;
    seed(&state)?;
    print_quick_counts(&state)?;

    eprintln!("Seeded {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path).with_context(|| format!("backup to {}", backup_path))?;
    fs::remove_file(path).with_context(|| format!("remove {}", db_path))?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn quota(id: &str, name: &str, target: i64) -> JobRoleQuota {
    JobRoleQuota {
        job_role_id: id.to_string(),
        job_role_code: id.to_uppercase(),
        job_role_name: name.to_string(),
        target_students: target,
    }
}

fn district(name: &str, centers: i64) -> DistrictAllocation {
    DistrictAllocation {
        district_name: name.to_string(),
        planned_center_count: centers,
    }
}

fn seed(state: &AppState) -> Result<()> {
    // ===== resources =====
    for i in 1..=6 {
        state.resource_api.onboard_resource(
            ResourceKind::Trainer,
            Some(format!("TR-{:03}", i)),
            &format!("Trainer {}", i),
        )?;
    }
    for i in 1..=3 {
        state.resource_api.onboard_resource(
            ResourceKind::Manager,
            Some(format!("MG-{:03}", i)),
            &format!("Center Manager {}", i),
        )?;
    }
    for i in 1..=4 {
        state.resource_api.onboard_resource(
            ResourceKind::Infrastructure,
            Some(format!("IN-{:03}", i)),
            &format!("Training Hall {}", i),
        )?;
    }
    state
        .resource_api
        .set_resource_status(ResourceKind::Trainer, "TR-006", "on_leave")?;

    // ===== contracts =====
    let apparel = state.contract_api.create_contract(
        NewContract {
            work_order_number: "WO-2025-001".to_string(),
            awarding_body: Some("State Skill Mission".to_string()),
            scheme_name: Some("Apparel Skilling".to_string()),
            job_roles: vec![
                quota("sew-op", "Sewing Machine Operator", 120),
                quota("qc-chk", "Quality Checker", 60),
            ],
            districts: vec![district("North", 2), district("East", 1)],
        },
        ACTOR,
    )?;
    let retail = state.contract_api.create_contract(
        NewContract {
            work_order_number: "WO-2025-002".to_string(),
            awarding_body: Some("National Skills Council".to_string()),
            scheme_name: Some("Retail Associates".to_string()),
            job_roles: vec![quota("retail", "Retail Sales Associate", 90)],
            districts: vec![district("South", 2)],
        },
        ACTOR,
    )?;

    // ===== centers =====
    let start = Local::now().date_naive();
    let term = DateRange::new(start, start + Duration::days(89)).map_err(anyhow::Error::msg)?;

    let plans = [
        (&apparel.contract_id, "sew-op", "CTR-NORTH-1", 60, "TR-001", Some("MG-001"), "IN-001"),
        (&apparel.contract_id, "sew-op", "CTR-NORTH-2", 40, "TR-002", None, "IN-002"),
        (&apparel.contract_id, "qc-chk", "CTR-EAST-1", 30, "TR-003", Some("MG-002"), "IN-003"),
        (&retail.contract_id, "retail", "CTR-SOUTH-1", 45, "TR-004", Some("MG-003"), "IN-004"),
    ];

    let mut opened = Vec::new();
    for (contract_id, job_role_id, center_id, students, trainer, manager, infra) in plans {
        let result = state.provisioning_api.open_center(&OpenCenterRequest {
            contract_id: contract_id.clone(),
            job_role_id: job_role_id.to_string(),
            center_id: center_id.to_string(),
            students,
            trainer_id: Some(trainer.to_string()),
            manager_id: manager.map(str::to_string),
            infra_id: Some(infra.to_string()),
            date_range: Some(term),
            actor: ACTOR.to_string(),
        })?;
        opened.push(result.batch);
    }

    // ===== stage progress =====
    let progress = [
        // mobilization, training, ojt, assessment, placement
        [55, 50, 30, 20, 12],
        [38, 20, 0, 0, 0],
        [30, 30, 28, 25, 18],
        [10, 0, 0, 0, 0],
    ];
    let stages = ["mobilization", "training", "ojt", "assessment", "placement"];
    for (batch, counts) in opened.iter().zip(progress.iter()) {
        for (stage, completed) in stages.iter().zip(counts.iter()) {
            if *completed > 0 {
                state
                    .contract_api
                    .record_stage_progress(&batch.batch_id, stage, *completed)?;
            }
        }
    }

    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<()> {
    let report = state.burndown_api.get_burndown(None)?;
    eprintln!(
        "contracts={} target={} allocated={} mobilized={} placed={}",
        report.overall.total_contracts,
        report.overall.total_target,
        report.overall.total_allocated,
        report.overall.total_mobilized,
        report.overall.total_placed
    );

    for (kind, summary) in state.resource_api.summary()? {
        eprintln!(
            "{}: total={} available={} assigned={} on_leave={}",
            kind, summary.total, summary.available, summary.assigned, summary.on_leave
        );
    }
    Ok(())
}
