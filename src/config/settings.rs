//! Configuration settings management
//!
//! Loads configuration from a TOML file under the platform config
//! directory, applies environment-variable overrides, and validates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{OpwatchError, Result};
use crate::operation::PollOptions;
use crate::utils::network::NetworkConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub debug: bool,
    /// Base URL of the resource-management service
    pub service_url: String,
    /// Bearer token attached to every request; normally supplied through
    /// the OPW_ACCESS_TOKEN environment variable rather than the file
    #[serde(default, skip_serializing)]
    pub access_token: String,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    /// Whether package uploads issue the activation PUT after transfer
    pub finalize_uploads: bool,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            service_url: String::new(),
            access_token: String::new(),
            poll_interval_secs: 10,
            poll_max_attempts: 30,
            finalize_uploads: true,
            connect_timeout_secs: 30,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(OpwatchError::config(
                "Service URL is required. Set service_url in the config file or OPW_SERVICE_URL.",
            ));
        }
        self.service_base_url()?;

        if self.poll_max_attempts == 0 {
            return Err(OpwatchError::config("poll_max_attempts must be at least 1"));
        }

        Ok(())
    }

    pub fn service_base_url(&self) -> Result<Url> {
        Url::parse(&self.service_url).map_err(|e| {
            OpwatchError::config(format!("Invalid service URL '{}': {e}", self.service_url))
        })
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::new(
            Duration::from_secs(self.poll_interval_secs),
            self.poll_max_attempts,
        )
    }

    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..NetworkConfig::default()
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| OpwatchError::config("Could not determine config directory"))?;
        Ok(config_dir.join("opwatch").join("config.toml"))
    }

    /// Read settings from a specific TOML file
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;

        toml::from_str::<Config>(&contents)
            .map_err(|e| OpwatchError::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Persist the file-backed settings to the config path
    pub async fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| OpwatchError::serialization(format!("Failed to encode config: {e}")))?;
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }
}

/// Load configuration from file and environment, with validation
pub async fn load_config() -> Result<Config> {
    let config = load_config_unvalidated().await?;
    config.validate()?;
    Ok(config)
}

/// Load configuration without validating; used by config management
/// commands that must work before any settings exist
pub async fn load_config_unvalidated() -> Result<Config> {
    let mut config = Config::default();

    let config_path = Config::get_config_path()?;
    if config_path.exists() {
        config = Config::load_from_path(&config_path).await?;
    }

    load_from_env(&mut config);

    Ok(config)
}

fn load_from_env(config: &mut Config) {
    if let Ok(value) = std::env::var("DEBUG") {
        config.debug = value.to_lowercase() == "true" || value == "1";
    }

    if let Ok(value) = std::env::var("OPW_SERVICE_URL") {
        config.service_url = value;
    }

    if let Ok(value) = std::env::var("OPW_ACCESS_TOKEN") {
        config.access_token = value;
    }

    if let Ok(value) = std::env::var("OPW_POLL_INTERVAL") {
        if let Ok(secs) = value.parse::<u64>() {
            config.poll_interval_secs = secs;
        }
    }

    if let Ok(value) = std::env::var("OPW_POLL_MAX_ATTEMPTS") {
        if let Ok(attempts) = value.parse::<u32>() {
            config.poll_max_attempts = attempts;
        }
    }
}
