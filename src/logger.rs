//! File logging for zest.
//!
//! Library code logs through the `log` macros only; this module installs the
//! `fern` dispatch that sends those records to a file when logging is enabled.

use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use crate::config::{Config, LoggingConfig};
use crate::constants::LOG_FILE_NAME;

/// Path of the log file inside the data directory
pub fn get_log_file_path() -> Result<PathBuf> {
    Ok(Config::get_data_dir()?.join(LOG_FILE_NAME))
}

/// Build the dispatch for `path` without installing it.
pub fn build_dispatch(level: LevelFilter, path: &Path) -> Result<fern::Dispatch> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;

    Ok(fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // Query logging from the ORM drowns everything else
        .level_for("sqlx", LevelFilter::Warn)
        .level_for("sea_orm", LevelFilter::Warn)
        .chain(file))
}

/// Install the global logger according to configuration.
///
/// Returns the log file path when logging is enabled, `None` otherwise.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let level: LevelFilter = config
        .level
        .parse()
        .with_context(|| format!("Invalid logging level '{}'", config.level))?;
    let path = get_log_file_path()?;

    build_dispatch(level, &path)?
        .apply()
        .context("Failed to install logger")?;

    log::info!("📝 Logging to {}", path.display());
    Ok(Some(path))
}
