// ==========================================
// SkillFlow Ledger - configuration manager
// ==========================================
// Loads, reads and overrides settings
// Storage: config_kv table (key-value + scope), global scope only
// ==========================================

use crate::config::engine_settings::{EngineSettings, MAX_PERCENT_DECIMALS};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a ConfigManager on its own connection
    ///
    /// # Arguments
    /// - db_path: database file path
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build a ConfigManager on a shared connection
    ///
    /// The shared PRAGMAs are applied again (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Read a value from config_kv (scope_id='global')
    ///
    /// # Returns
    /// - Some(String): stored value
    /// - None: key not set
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Write a global value (insert or overwrite)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// All global values as a JSON object string
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// Load the engine settings, falling back to defaults per key
    ///
    /// A missing key uses its default silently; an unparsable or out-of-range
    /// value uses its default and is logged.
    pub fn load_settings(&self) -> Result<EngineSettings, Box<dyn Error>> {
        let defaults = EngineSettings::default();

        let booking_history_limit = self
            .parse_or_default::<usize>(
                config_keys::BOOKING_HISTORY_LIMIT,
                defaults.booking_history_limit,
            )?;
        let booking_history_limit = if booking_history_limit == 0 {
            tracing::warn!(
                config_key = config_keys::BOOKING_HISTORY_LIMIT,
                "limit must be positive, using default"
            );
            defaults.booking_history_limit
        } else {
            booking_history_limit
        };

        let percent_decimals = self
            .parse_or_default::<u32>(config_keys::PERCENT_DECIMALS, defaults.percent_decimals)?;
        let percent_decimals = if percent_decimals > MAX_PERCENT_DECIMALS {
            tracing::warn!(
                config_key = config_keys::PERCENT_DECIMALS,
                value = percent_decimals,
                "too many decimals, using default"
            );
            defaults.percent_decimals
        } else {
            percent_decimals
        };

        let require_date_range = self
            .parse_or_default::<bool>(config_keys::REQUIRE_DATE_RANGE, defaults.require_date_range)?;

        Ok(EngineSettings {
            booking_history_limit,
            percent_decimals,
            require_date_range,
        })
    }

    fn parse_or_default<T: FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "unparsable config value, using default");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // resources
    pub const BOOKING_HISTORY_LIMIT: &str = "resource.booking_history_limit";

    // ledger / burn-down
    pub const PERCENT_DECIMALS: &str = "ledger.percent_decimals";

    // provisioning
    pub const REQUIRE_DATE_RANGE: &str = "provisioning.require_date_range";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = manager().load_settings().unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = manager();
        config
            .set_global_config_value(config_keys::BOOKING_HISTORY_LIMIT, "25")
            .unwrap();
        config
            .set_global_config_value(config_keys::PERCENT_DECIMALS, "2")
            .unwrap();
        config
            .set_global_config_value(config_keys::REQUIRE_DATE_RANGE, "true")
            .unwrap();

        let settings = config.load_settings().unwrap();
        assert_eq!(settings.booking_history_limit, 25);
        assert_eq!(settings.percent_decimals, 2);
        assert!(settings.require_date_range);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = manager();
        config
            .set_global_config_value(config_keys::BOOKING_HISTORY_LIMIT, "lots")
            .unwrap();
        config
            .set_global_config_value(config_keys::PERCENT_DECIMALS, "9")
            .unwrap();

        let settings = config.load_settings().unwrap();
        assert_eq!(settings.booking_history_limit, 100);
        assert_eq!(settings.percent_decimals, 1);
    }

    #[test]
    fn test_snapshot_lists_global_values() {
        let config = manager();
        config.set_global_config_value("a.key", "1").unwrap();
        let snapshot: serde_json::Value =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["a.key"], "1");
    }
}
