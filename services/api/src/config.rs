//! services/api/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the campaign snapshot is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file per storage key under `data_dir`.
    File,
    /// A row in the `campaign_snapshots` table.
    Postgres { database_url: String },
    /// Process memory only; lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            // The URL is filled in by `Config::from_env`.
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres {
                database_url: String::new(),
            }),
            other => Err(format!("'{}' is not one of file, postgres, memory", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub sheet_fetch_timeout: Duration,
    pub cors_origin: String,
    pub default_campaign_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Storage Settings ---
        let backend_str = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".to_string());
        let storage = match backend_str.parse::<StorageBackend>() {
            Ok(StorageBackend::Postgres { .. }) => StorageBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            },
            Ok(other) => other,
            Err(e) => return Err(ConfigError::InvalidValue("STORAGE_BACKEND".to_string(), e)),
        };

        let data_dir = std::env::var("CAMPAIGN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let storage_key = std::env::var("CAMPAIGN_STORAGE_KEY")
            .unwrap_or_else(|_| "outreach_campaign".to_string());
        if storage_key.is_empty()
            || !storage_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(ConfigError::InvalidValue(
                "CAMPAIGN_STORAGE_KEY".to_string(),
                format!("'{}' must be non-empty and use only [A-Za-z0-9._-]", storage_key),
            ));
        }

        // --- Load Import and Campaign Settings ---
        let timeout_str =
            std::env::var("SHEET_FETCH_TIMEOUT_SECS").unwrap_or_else(|_| "15".to_string());
        let sheet_fetch_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("SHEET_FETCH_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let default_campaign_name = std::env::var("DEFAULT_CAMPAIGN_NAME")
            .unwrap_or_else(|_| outreach_core::DEFAULT_CAMPAIGN_NAME.to_string());

        Ok(Self {
            bind_address,
            log_level,
            storage,
            data_dir,
            storage_key,
            sheet_fetch_timeout,
            cors_origin,
            default_campaign_name,
        })
    }
}
