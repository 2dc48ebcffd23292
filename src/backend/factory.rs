//! Backend factory for creating backend instances from configuration.

use anyhow::{anyhow, Context, Result};

use super::{todoist::TodoistBackend, Backend};
use crate::config::ApiConfig;
use crate::todoist::TodoistClient;

/// Create a backend instance from the API configuration.
///
/// # Errors
/// Returns error if:
/// - Backend type is unknown
/// - The HTTP client cannot be built
pub fn create_backend(config: &ApiConfig) -> Result<Box<dyn Backend>> {
    match config.backend_type.as_str() {
        "todoist" => {
            let client = TodoistClient::with_base_url(&config.base_url).context("Failed to build Todoist client")?;
            Ok(Box::new(TodoistBackend::new(client)))
        }
        other => Err(anyhow!("Unknown backend type: {}", other)),
    }
}
