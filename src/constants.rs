//! Constants used throughout the application
//!
//! This module centralizes storage keys, endpoint paths, user-facing
//! messages and other constant values to keep them consistent.

// Durable storage keys
pub const KEY_LOCAL_TASKS: &str = "local_tasks";
pub const KEY_LOCAL_COMPLETED_TASKS: &str = "local_completed_tasks";
pub const KEY_REMOTE_TASKS: &str = "todoist_tasks_api";
pub const KEY_REMOTE_COMPLETED_TASKS: &str = "todoist_completed_tasks_api";
pub const KEY_SYNC_CURSOR: &str = "last_sync_token";
pub const KEY_ACCESS_TOKEN: &str = "todoist_access_token";

// Todoist endpoints
pub const TODOIST_BASE_URL: &str = "https://api.todoist.com";
pub const REST_TASKS_PATH: &str = "/rest/v2/tasks";
pub const SYNC_PATH: &str = "/sync/v9/sync";
pub const COMPLETED_TASKS_PATH: &str = "/sync/v9/completed/get_all";
pub const ACTIVITY_LOG_PATH: &str = "/sync/v9/activity/get";

/// Cursor value requesting a full (non-incremental) sync
pub const FULL_SYNC_CURSOR: &str = "*";
/// Resource filter sent with every full sync
pub const SYNC_RESOURCE_TYPES: &str = r#"["items"]"#;
/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// Activity log paging defaults
pub const ACTIVITY_DEFAULT_PAGE: u32 = 0;
pub const ACTIVITY_DEFAULT_LIMIT: u32 = 30;
pub const ACTIVITY_MAX_LIMIT: u32 = 100;

// Batch command types
pub const COMMAND_ITEM_UNCOMPLETE: &str = "item_uncomplete";
pub const COMMAND_ITEM_DELETE: &str = "item_delete";

// Error Messages
pub const ERROR_UNKNOWN: &str = "Unknown error";
pub const ERROR_NO_CREDENTIAL: &str = "Not signed in: no Todoist access token stored";
pub const ERROR_NO_SYNC_CURSOR: &str = "No sync cursor stored: run a full sync first";
pub const ERROR_REQUEST_TIMEOUT: &str = "Request timed out";

// Log Messages
pub const LOG_FETCHED_TASKS: &str = "✅ Fetched tasks from Todoist";
pub const LOG_FETCHED_COMPLETED: &str = "✅ Fetched completed tasks from Todoist";
pub const LOG_FETCHED_ACTIVITY: &str = "✅ Fetched activity log from Todoist";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";

// Config directory and file names
pub const APP_DIR_NAME: &str = "zest";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOCAL_CONFIG_FILE_NAME: &str = "zest.toml";
pub const DATABASE_FILE_NAME: &str = "zest.db";
pub const LOG_FILE_NAME: &str = "zest.log";

/// Environment variable seeding the stored access token
pub const ENV_API_TOKEN: &str = "TODOIST_API_TOKEN";

/// Upper bound on the per-request timeout, in seconds
pub const REQUEST_TIMEOUT_MAX_SECS: u64 = 600;
