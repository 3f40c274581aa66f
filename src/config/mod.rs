// ==========================================
// SkillFlow Ledger - configuration layer
// ==========================================
// Storage: config_kv table, global scope
// Process-level settings (DB path, RUST_LOG) come from the environment
// ==========================================

pub mod config_manager;
pub mod engine_settings;

pub use config_manager::{config_keys, ConfigManager};
pub use engine_settings::EngineSettings;
