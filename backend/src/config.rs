//! # Configuration
//!
//! Application settings are read from a YAML file. The path comes from the
//! `CAFE_MANAGER_CONFIG` environment variable, falling back to
//! `config.yaml` inside the default data directory. A missing file means
//! "use the defaults"; a malformed one is an error.

use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable pointing at the configuration file
pub const CONFIG_ENV_VAR: &str = "CAFE_MANAGER_CONFIG";

const CONFIG_FILE_NAME: &str = "config.yaml";
const DEFAULT_DIRECTORY_NAME: &str = "Cafe Manager";
const MAX_WINDOW_DAYS: i64 = crate::domain::error::MAX_WINDOW_DAYS;
const MAX_PAIRING_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Which key/value backend persists the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Files,
}

/// Connection settings for the AI advisor proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// URL of the proxy accepting `{prompt, context}` and returning `{text}`
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    /// Name of the environment variable holding the proxy credential
    pub api_key_env: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: 20,
            api_key_env: "CAFE_MANAGER_ADVISOR_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where collections are stored; defaults to the platform data directory
    pub data_directory: Option<PathBuf>,
    pub storage: StorageBackend,
    pub bind_address: SocketAddr,
    /// Origin allowed by CORS
    pub frontend_origin: String,
    /// Look-ahead used by the dashboard expiry alerts
    pub alert_window_days: i64,
    pub asset_maintenance_interval_days: i64,
    pub pairing_ttl_seconds: i64,
    pub advisor: AdvisorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: None,
            storage: StorageBackend::Sqlite,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            frontend_origin: "http://localhost:8080".to_string(),
            alert_window_days: 30,
            asset_maintenance_interval_days: 180,
            pairing_ttl_seconds: 120,
            advisor: AdvisorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `CAFE_MANAGER_CONFIG` or the default location
    pub fn load() -> Result<Self> {
        let path = match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_data_directory().join(CONFIG_FILE_NAME),
        };
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject windows and durations that date arithmetic cannot hold
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0..=MAX_WINDOW_DAYS).contains(&self.alert_window_days),
            "alert_window_days must be between 0 and {}",
            MAX_WINDOW_DAYS
        );
        ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&self.asset_maintenance_interval_days),
            "asset_maintenance_interval_days must be between 1 and {}",
            MAX_WINDOW_DAYS
        );
        ensure!(
            (1..=MAX_PAIRING_TTL_SECONDS).contains(&self.pairing_ttl_seconds),
            "pairing_ttl_seconds must be between 1 and {}",
            MAX_PAIRING_TTL_SECONDS
        );
        ensure!(
            self.advisor.timeout_seconds > 0,
            "advisor.timeout_seconds must be greater than zero"
        );
        Ok(())
    }

    /// Resolved data directory
    pub fn data_directory(&self) -> PathBuf {
        self.data_directory
            .clone()
            .unwrap_or_else(default_data_directory)
    }
}

/// `<platform data dir>/Cafe Manager`, or `./Cafe Manager` when the platform has none
pub fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIRECTORY_NAME)
}
