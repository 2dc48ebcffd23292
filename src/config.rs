//! Configuration management for zest
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    ACTIVITY_MAX_LIMIT, APP_DIR_NAME, CONFIG_FILE_NAME, CONFIG_GENERATED, DATABASE_FILE_NAME,
    LOCAL_CONFIG_FILE_NAME, REQUEST_TIMEOUT_MAX_SECS, TODOIST_BASE_URL,
};
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub activity: ActivityConfig,
    pub logging: LoggingConfig,
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend type; only "todoist" is supported
    pub backend_type: String,
    /// Base URL of the service, without a trailing path
    pub base_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path; defaults to the XDG data directory
    pub database_path: Option<PathBuf>,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Per-request timeout in seconds (0 = wait indefinitely)
    pub request_timeout_secs: u64,
}

/// Activity log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Events fetched per page
    pub page_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging to file
    pub enabled: bool,
    /// Log level: error, warn, info, debug or trace
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_type: "todoist".to_string(),
            base_url: TODOIST_BASE_URL.to_string(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            page_size: crate::constants::ACTIVITY_DEFAULT_LIMIT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl SyncConfig {
    /// Timeout applied to each remote call, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.backend_type != "todoist" {
            anyhow::bail!("unsupported backend_type '{}'", self.api.backend_type);
        }

        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            anyhow::bail!("base_url must be an http(s) URL, got '{}'", self.api.base_url);
        }

        if self.sync.request_timeout_secs > REQUEST_TIMEOUT_MAX_SECS {
            anyhow::bail!("request_timeout_secs cannot exceed {}", REQUEST_TIMEOUT_MAX_SECS);
        }

        if self.activity.page_size == 0 || self.activity.page_size > ACTIVITY_MAX_LIMIT {
            anyhow::bail!(
                "activity page_size must be between 1 and {}, got {}",
                ACTIVITY_MAX_LIMIT,
                self.activity.page_size
            );
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!("Invalid logging level '{}'", self.logging.level);
        }

        Ok(())
    }

    /// Resolve the database file path
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::get_data_dir()?.join(DATABASE_FILE_NAME)),
        }
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# Zest Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format(datetime::TODOIST_DATE_FORMAT)
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Get the XDG data directory path
    pub fn get_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join(APP_DIR_NAME))
    }
}
