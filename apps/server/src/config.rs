//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! The database itself is NOT configured here: it is chosen at runtime through
//! the setup API and remembered in `setup-config.json`.

use directories::ProjectDirs;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use shopkeep_core::SETUP_CONFIG_FILE_NAME;
use shopkeep_db::PoolSettings;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to listen on
    pub bind_addr: IpAddr,

    /// HTTP port
    pub http_port: u16,

    /// Location of the persisted setup document
    pub setup_config_path: PathBuf,

    /// Upper bound on opening a database connection
    pub db_connect_timeout: Duration,

    /// Pool size for the runtime database
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `SHOPKEEP_BIND_ADDR` (default `0.0.0.0`)
    /// - `SHOPKEEP_HTTP_PORT` (default `3001`)
    /// - `SHOPKEEP_SETUP_CONFIG_PATH` (default: platform data dir)
    /// - `SHOPKEEP_DB_CONNECT_TIMEOUT_SECS` (default `10`)
    /// - `SHOPKEEP_DB_MAX_CONNECTIONS` (default `10`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ServerConfig {
            bind_addr: var("SHOPKEEP_BIND_ADDR", "0.0.0.0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPKEEP_BIND_ADDR".to_string()))?,

            http_port: var("SHOPKEEP_HTTP_PORT", "3001")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPKEEP_HTTP_PORT".to_string()))?,

            setup_config_path: match lookup("SHOPKEEP_SETUP_CONFIG_PATH") {
                Some(path) if !path.trim().is_empty() => PathBuf::from(path),
                _ => default_setup_config_path()?,
            },

            db_connect_timeout: Duration::from_secs(
                var("SHOPKEEP_DB_CONNECT_TIMEOUT_SECS", "10")
                    .parse()
                    .map_err(|_| {
                        ConfigError::InvalidValue("SHOPKEEP_DB_CONNECT_TIMEOUT_SECS".to_string())
                    })?,
            ),

            db_max_connections: var("SHOPKEEP_DB_MAX_CONNECTIONS", "10")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHOPKEEP_DB_MAX_CONNECTIONS".to_string()))?,
        };

        if config.db_connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "SHOPKEEP_DB_CONNECT_TIMEOUT_SECS".to_string(),
            ));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "SHOPKEEP_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// Pool settings applied to every runtime connection.
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings::default()
            .connect_timeout(self.db_connect_timeout)
            .max_connections(self.db_max_connections)
    }
}

/// Platform data directory for the setup document.
///
/// - **macOS**: `~/Library/Application Support/com.shopkeep.server/`
/// - **Windows**: `%APPDATA%\shopkeep\server\data\`
/// - **Linux**: `~/.local/share/server/`
fn default_setup_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "shopkeep", "server").ok_or_else(|| {
        ConfigError::MissingRequired("SHOPKEEP_SETUP_CONFIG_PATH".to_string())
    })?;
    Ok(dirs.data_dir().join(SETUP_CONFIG_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::load_from(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPKEEP_SETUP_CONFIG_PATH", "/tmp/setup.json")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert_eq!(config.setup_config_path, PathBuf::from("/tmp/setup.json"));
        assert_eq!(config.db_connect_timeout, Duration::from_secs(10));
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOPKEEP_BIND_ADDR", "127.0.0.1"),
            ("SHOPKEEP_HTTP_PORT", "8080"),
            ("SHOPKEEP_SETUP_CONFIG_PATH", "/tmp/setup.json"),
            ("SHOPKEEP_DB_CONNECT_TIMEOUT_SECS", "3"),
            ("SHOPKEEP_DB_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        let settings = config.pool_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(3));
        assert_eq!(settings.max_connections, 4);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("SHOPKEEP_HTTP_PORT", "http")]),
            Err(ConfigError::InvalidValue(key)) if key == "SHOPKEEP_HTTP_PORT"
        ));
        assert!(load(&[("SHOPKEEP_BIND_ADDR", "localhost:80")]).is_err());
        assert!(load(&[
            ("SHOPKEEP_SETUP_CONFIG_PATH", "/tmp/setup.json"),
            ("SHOPKEEP_DB_MAX_CONNECTIONS", "0"),
        ])
        .is_err());
    }
}
