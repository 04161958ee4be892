//! Server configuration
//!
//! Everything is read from environment variables, after loading a `.env`
//! file if one is present. Unset variables fall back to defaults; set but
//! unparseable ones fail startup with the variable's name.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::db::DatabaseLocation;
use crate::storage::StorageBackend;

pub const STORAGE_VAR: &str = "FITTRACK_STORAGE";
pub const DATABASE_PATH_VAR: &str = "FITTRACK_DATABASE_PATH";
pub const HOST_VAR: &str = "FITTRACK_HOST";
pub const PORT_VAR: &str = "PORT";
pub const ENV_VAR: &str = "FITTRACK_ENV";

/// `true` selects the document backend when `FITTRACK_STORAGE` is unset
pub const LEGACY_STORAGE_VAR: &str = "USE_MONGODB";
/// Read when `FITTRACK_ENV` is unset; only `development` counts as development
pub const LEGACY_ENV_VAR: &str = "NODE_ENV";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {var} value '{value}': expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, expected: &'static str) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            expected,
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub backend: StorageBackend,
    pub database: DatabaseLocation,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database: DatabaseLocation::File(default_database_path()),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: Environment::default(),
        }
    }
}

impl ServerConfig {
    /// Load `.env`, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded {}", path.display());
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let backend = match (lookup(STORAGE_VAR), lookup(LEGACY_STORAGE_VAR)) {
            (Some(v), _) => StorageBackend::from_str(&v)
                .ok_or_else(|| ConfigError::invalid(STORAGE_VAR, &v, "memory, document or mapped"))?,
            (None, Some(flag)) if flag.trim() == "true" => StorageBackend::Document,
            (None, _) => StorageBackend::default(),
        };

        let database = match lookup(DATABASE_PATH_VAR) {
            Some(v) if v.trim() == ":memory:" => DatabaseLocation::Memory,
            Some(v) => DatabaseLocation::File(PathBuf::from(v)),
            None => DatabaseLocation::File(default_database_path()),
        };

        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_VAR) {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid(PORT_VAR, &v, "a port number"))?,
            None => DEFAULT_PORT,
        };

        let environment = match (lookup(ENV_VAR), lookup(LEGACY_ENV_VAR)) {
            (Some(v), _) => Environment::from_str(&v)
                .ok_or_else(|| ConfigError::invalid(ENV_VAR, &v, "development or production"))?,
            (None, Some(v)) if v.trim() == "development" => Environment::Development,
            (None, Some(_)) => Environment::Production,
            (None, None) => Environment::default(),
        };

        Ok(Self {
            backend,
            database,
            host,
            port,
            environment,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `data/fittrack.db` under the project root, found relative to the binary
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("fittrack.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        match config.database {
            DatabaseLocation::File(path) => assert!(path.ends_with("data/fittrack.db")),
            DatabaseLocation::Memory => panic!("expected a file database"),
        }
    }

    #[test]
    fn test_explicit_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            (STORAGE_VAR, "Mapped"),
            (DATABASE_PATH_VAR, ":memory:"),
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "8080"),
            (ENV_VAR, "production"),
        ]))
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Mapped);
        assert_eq!(config.database, DatabaseLocation::Memory);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(!config.environment.is_development());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[(PORT_VAR, "  "), (STORAGE_VAR, "")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ServerConfig::from_lookup(lookup(&[(PORT_VAR, "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = ServerConfig::from_lookup(lookup(&[(STORAGE_VAR, "mongo")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: STORAGE_VAR,
                value: "mongo".into(),
                expected: "memory, document or mapped",
            }
        );

        assert!(ServerConfig::from_lookup(lookup(&[(ENV_VAR, "staging")])).is_err());
    }

    #[test]
    fn test_legacy_variables_apply_when_primary_is_unset() {
        let config = ServerConfig::from_lookup(lookup(&[
            (LEGACY_STORAGE_VAR, "true"),
            (LEGACY_ENV_VAR, "test"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StorageBackend::Document);
        assert_eq!(config.environment, Environment::Production);

        let config = ServerConfig::from_lookup(lookup(&[
            (LEGACY_STORAGE_VAR, "false"),
            (LEGACY_ENV_VAR, "development"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.environment, Environment::Development);

        let config = ServerConfig::from_lookup(lookup(&[
            (STORAGE_VAR, "mapped"),
            (LEGACY_STORAGE_VAR, "true"),
            (ENV_VAR, "development"),
            (LEGACY_ENV_VAR, "production"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StorageBackend::Mapped);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        temp_env::with_vars(
            [
                (STORAGE_VAR, Some("document")),
                (DATABASE_PATH_VAR, Some("/tmp/fittrack-test.db")),
                (PORT_VAR, Some("4100")),
                (HOST_VAR, None),
                (ENV_VAR, None),
                (LEGACY_STORAGE_VAR, None),
                (LEGACY_ENV_VAR, None),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.backend, StorageBackend::Document);
                assert_eq!(
                    config.database,
                    DatabaseLocation::File(PathBuf::from("/tmp/fittrack-test.db"))
                );
                assert_eq!(config.port, 4100);
            },
        );
    }
}
