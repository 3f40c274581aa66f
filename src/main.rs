// ==========================================
// SkillFlow Ledger - command-line entry point
// ==========================================
// Usage: skillflow-ledger <command> [payload-json]
//        skillflow-ledger commands
// Database: SKILLFLOW_DB_PATH or the per-user data dir
// ==========================================

use anyhow::{bail, Context};
use skillflow_ledger::app::{execute_command, get_default_db_path, AppState, COMMAND_NAMES};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skillflow_ledger::logging::init();

    let mut args = std::env::args().skip(1);
    let command = match args.next() {
        Some(command) => command,
        None => {
            print_usage();
            bail!("missing command");
        }
    };

    if command == "commands" || command == "--help" || command == "-h" {
        print_usage();
        return Ok(());
    }

    let payload = match args.next() {
        Some(raw) => serde_json::from_str::<serde_json::Value>(&raw)
            .with_context(|| format!("payload for {} is not valid JSON", command))?,
        None => serde_json::Value::Null,
    };

    tracing::info!("{} v{}", skillflow_ledger::APP_NAME, skillflow_ledger::VERSION);

    let db_path = get_default_db_path();
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let state = Arc::new(state);

    match execute_command(state, &command, payload).await {
        Ok(result) => {
            println!("{}", result);
            Ok(())
        }
        Err(error_json) => {
            println!("{}", error_json);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("usage: skillflow-ledger <command> [payload-json]");
    eprintln!();
    eprintln!("commands:");
    for name in COMMAND_NAMES {
        eprintln!("  {}", name);
    }
}
