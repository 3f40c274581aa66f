// ==========================================
// SkillFlow Ledger - application state
// ==========================================
// Owns the shared connection and every API instance
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{BurndownApi, ContractApi, LedgerApi, ProvisioningApi, ResourceApi};
use crate::config::{ConfigManager, EngineSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    AllocationRepository, BatchRepository, ContractRepository, ResourceRepository,
    StageProgressRepository,
};

/// Environment variable overriding the database file
pub const DB_PATH_ENV: &str = "SKILLFLOW_DB_PATH";

/// Application state
///
/// Built once per process; commands borrow it through an `Arc`.
pub struct AppState {
    /// Database file path
    pub db_path: String,

    /// Settings read from config_kv at startup
    pub settings: EngineSettings,

    pub contract_api: Arc<ContractApi>,
    pub ledger_api: Arc<LedgerApi>,
    pub resource_api: Arc<ResourceApi>,
    pub burndown_api: Arc<BurndownApi>,
    pub provisioning_api: Arc<ProvisioningApi>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// Open the database, ensure the schema and wire every API
    ///
    /// # Arguments
    /// - db_path: database file path (created when missing)
    ///
    /// # Returns
    /// - Err(String): the database could not be opened or initialized
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database {}: {}", db_path, e))?;
        init_schema(&conn).map_err(|e| format!("cannot initialize schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Configuration
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("cannot create ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_settings()
            .map_err(|e| format!("cannot load settings: {}", e))?;
        tracing::debug!(?settings, "engine settings loaded");

        // ==========================================
        // Repositories
        // ==========================================
        let contract_repo = Arc::new(ContractRepository::new(conn.clone()));
        let batch_repo = Arc::new(BatchRepository::new(conn.clone()));
        let allocation_repo = Arc::new(AllocationRepository::new(conn.clone()));
        let resource_repo = Arc::new(ResourceRepository::new(conn.clone()));
        let stage_repo = Arc::new(StageProgressRepository::new(conn));

        // ==========================================
        // APIs
        // ==========================================
        let contract_api = Arc::new(ContractApi::new(
            contract_repo.clone(),
            batch_repo.clone(),
            stage_repo.clone(),
        ));
        let ledger_api = Arc::new(LedgerApi::new(
            contract_repo.clone(),
            batch_repo.clone(),
            allocation_repo,
            &settings,
        ));
        let resource_api = Arc::new(ResourceApi::new(resource_repo, &settings));
        let burndown_api = Arc::new(BurndownApi::new(
            contract_repo.clone(),
            batch_repo,
            stage_repo,
            &settings,
        ));
        let provisioning_api = Arc::new(ProvisioningApi::new(
            contract_repo,
            ledger_api.clone(),
            resource_api.clone(),
            &settings,
        ));

        tracing::info!("AppState ready");

        Ok(Self {
            db_path,
            settings,
            contract_api,
            ledger_api,
            resource_api,
            burndown_api,
            provisioning_api,
            config_manager,
        })
    }
}

/// Default database path
///
/// `SKILLFLOW_DB_PATH` wins; otherwise `<data_dir>/skillflow-ledger/skillflow_ledger.db`,
/// falling back to `./skillflow_ledger.db` when no data dir is known.
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./skillflow_ledger.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("skillflow-ledger");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("skillflow_ledger.db"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "cannot create data dir, using working directory"),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path_file_name() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_on_temp_db() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let state = AppState::new(tmp.path().to_string_lossy().to_string()).unwrap();
        assert_eq!(state.settings, EngineSettings::default());
        assert!(state.contract_api.list_contracts(None).unwrap().is_empty());
    }
}
