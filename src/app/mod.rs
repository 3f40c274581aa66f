// ==========================================
// SkillFlow Ledger - application layer
// ==========================================
// AppState wiring + JSON command surface
// ==========================================

pub mod commands;
pub mod state;

// Re-exports
pub use commands::{execute_command, ErrorResponse, COMMAND_NAMES};
pub use state::{get_default_db_path, AppState};
