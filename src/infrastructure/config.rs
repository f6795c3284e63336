//! Configuration infrastructure
//!
//! Settings live in `config.json` under the user config directory. The file
//! is created with defaults on first run. `AppConfig::from_file` layers an
//! explicit file with `AIPOPS_*` environment overrides.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::info;

pub use crate::infrastructure::http_client::HttpClientConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from file: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub http: HttpClientConfig,
    pub navigation: NavigationConfig,
    pub registry: RegistryConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (stderr, so JSON records on stdout stay clean)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::MAX_LOG_FILES,
            auto_cleanup_logs: true,
            module_filters: HashMap::new(),
        }
    }
}

/// Navigation timeouts and page acceptance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub landing_timeout_seconds: u64,
    pub edition_timeout_seconds: u64,
    pub reach_timeout_seconds: u64,
    /// A reached page without the code is still accepted above this length
    pub min_content_length: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            landing_timeout_seconds: defaults::LANDING_TIMEOUT_SECONDS,
            edition_timeout_seconds: defaults::EDITION_TIMEOUT_SECONDS,
            reach_timeout_seconds: defaults::REACH_TIMEOUT_SECONDS,
            min_content_length: defaults::MIN_CONTENT_LENGTH,
        }
    }
}

impl NavigationConfig {
    pub fn landing_timeout(&self) -> Duration {
        Duration::from_secs(self.landing_timeout_seconds)
    }

    pub fn edition_timeout(&self) -> Duration {
        Duration::from_secs(self.edition_timeout_seconds)
    }

    pub fn reach_timeout(&self) -> Duration {
        Duration::from_secs(self.reach_timeout_seconds)
    }
}

/// Strategy registry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Country whose strategy serves lookups for unregistered countries
    pub default_country: String,

    /// JSON array of extra country profiles merged over the embedded catalog
    pub profiles_path: Option<PathBuf>,

    /// Country used when no prefix matches the airport code
    pub unresolved_fallback: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_country: defaults::DEFAULT_COUNTRY.to_string(),
            profiles_path: None,
            unresolved_fallback: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, then apply `AIPOPS_` environment overrides.
    ///
    /// Nested keys use a double underscore:
    /// `AIPOPS_REGISTRY__DEFAULT_COUNTRY=Latvia`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("AIPOPS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        if nav.landing_timeout_seconds == 0
            || nav.edition_timeout_seconds == 0
            || nav.reach_timeout_seconds == 0
        {
            return Err(ConfigError::validation("navigation timeouts must be greater than 0"));
        }

        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::validation("http.timeout_seconds must be greater than 0"));
        }

        if self.http.max_requests_per_second == 0 {
            return Err(ConfigError::validation(
                "http.max_requests_per_second must be greater than 0",
            ));
        }

        if self.registry.default_country.trim().is_empty() {
            return Err(ConfigError::validation("registry.default_country must not be empty"));
        }

        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Initialize configuration system on first run
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        if self.config_path.exists() {
            return self.load_config().await;
        }

        info!("First run detected - writing default configuration");
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        Ok(default_config)
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Configuration file contains invalid JSON")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", self.config_path))?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {:?}", self.config_path);
        Ok(())
    }

    /// Reset configuration to defaults (useful for troubleshooting)
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("Resetting configuration to defaults");
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        Ok(default_config)
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "aip-ops-scraper";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_NAME: &str = "aip-ops-scraper.log";
    pub const MAX_LOG_FILES: u32 = 5;

    pub const USER_AGENT: &str = "aip-ops-scraper/0.2 (aerodrome operational data)";
    pub const HTTP_TIMEOUT_SECONDS: u64 = 30;
    pub const MAX_REQUESTS_PER_SECOND: u32 = 4;

    pub const LANDING_TIMEOUT_SECONDS: u64 = 30;
    pub const EDITION_TIMEOUT_SECONDS: u64 = 45;
    pub const REACH_TIMEOUT_SECONDS: u64 = 10;

    /// Text longer than this is accepted even without the airport code
    pub const MIN_CONTENT_LENGTH: usize = 500;

    pub const DEFAULT_COUNTRY: &str = "United Kingdom";
}
