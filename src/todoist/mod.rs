//! Todoist API client.
//!
//! A thin async client over the REST v2 and Sync v9 endpoints. Every request
//! is authenticated with the bearer token handed in by the caller, carries a
//! fresh `X-Request-Id` and asks intermediaries not to cache. Responses are
//! classified into [`ApiError`] variants before anything is returned.

pub mod commands;
pub mod error;
pub mod models;

use log::{debug, warn};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::constants::{
    ACTIVITY_LOG_PATH, COMPLETED_TASKS_PATH, REQUEST_ID_HEADER, REST_TASKS_PATH, SYNC_PATH, SYNC_RESOURCE_TYPES,
};

pub use commands::{Command, SyncCursor};
pub use error::{ApiError, ErrorBody};
pub use models::{
    ActivityEvent, ActivityEventType, ActivityObjectType, ActivityQuery, ActivityResponse, CompletedItem,
    CompletedResponse, CreateTaskArgs, Due, RestTask, SyncItem, SyncResponse, UpdateTaskArgs,
};

/// Bearer credential for the Todoist API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// HTTP client for the Todoist API.
#[derive(Clone, Debug)]
pub struct TodoistClient {
    http: Client,
    base_url: String,
}

impl TodoistClient {
    /// Create a client against `base_url`, normally the public Todoist host.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let http = Client::builder().build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))
    }

    /// URL of one task, with `task_id` percent-encoded as a single path segment.
    fn task_url(&self, task_id: &str, action: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.url(REST_TASKS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .push(task_id)
            .extend(action);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &AccessToken) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token.expose())
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .header(CACHE_CONTROL, "no-cache")
    }

    /// Send a request and return the body of a successful response.
    async fn send(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = ErrorBody::parse(&text);
            warn!("❌ Todoist responded {status}: {body}");
            return Err(ApiError::Status { status, body });
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let text = Self::send(request).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Create a task; returns the service's canonical representation.
    pub async fn create_task(&self, token: &AccessToken, args: &CreateTaskArgs) -> Result<RestTask, ApiError> {
        debug!("Creating task '{}'", args.content);
        Self::send_json(self.request(Method::POST, self.url(REST_TASKS_PATH)?, token).json(args)).await
    }

    /// Apply a partial update to a task.
    pub async fn update_task(
        &self,
        token: &AccessToken,
        task_id: &str,
        args: &UpdateTaskArgs,
    ) -> Result<RestTask, ApiError> {
        let url = self.task_url(task_id, None)?;
        Self::send_json(self.request(Method::POST, url, token).json(args)).await
    }

    /// Mark a task complete.
    pub async fn close_task(&self, token: &AccessToken, task_id: &str) -> Result<(), ApiError> {
        let url = self.task_url(task_id, Some("close"))?;
        Self::send(self.request(Method::POST, url, token)).await.map(|_| ())
    }

    /// Fetch a single live task.
    pub async fn get_task(&self, token: &AccessToken, task_id: &str) -> Result<RestTask, ApiError> {
        let url = self.task_url(task_id, None)?;
        Self::send_json(self.request(Method::GET, url, token)).await
    }

    /// Fetch every live item with the wildcard cursor.
    pub async fn full_sync(&self, token: &AccessToken) -> Result<SyncResponse, ApiError> {
        let cursor = SyncCursor::full();
        let form = [("sync_token", cursor.as_str()), ("resource_types", SYNC_RESOURCE_TYPES)];
        let request = self.request(Method::POST, self.url(SYNC_PATH)?, token).form(&form);
        let response: SyncResponse = Self::send_json(request).await?;

        if response.sync_token.is_none() {
            return Err(ApiError::Decode("sync response carried no sync_token".to_string()));
        }
        Ok(response)
    }

    /// Post a batch of commands scoped to `cursor` and check each command's status.
    pub async fn execute_commands(
        &self,
        token: &AccessToken,
        cursor: &SyncCursor,
        commands: &[Command],
    ) -> Result<SyncResponse, ApiError> {
        let encoded = serde_json::to_string(commands).map_err(|e| ApiError::Decode(e.to_string()))?;
        let form = [("sync_token", cursor.as_str()), ("commands", encoded.as_str())];
        let request = self.request(Method::POST, self.url(SYNC_PATH)?, token).form(&form);
        let response: SyncResponse = Self::send_json(request).await?;

        for command in commands {
            check_command_status(&response, command)?;
        }
        Ok(response)
    }

    /// Reopen a completed task via an `item_uncomplete` command.
    pub async fn reopen_task(
        &self,
        token: &AccessToken,
        cursor: &SyncCursor,
        task_id: &str,
    ) -> Result<SyncResponse, ApiError> {
        self.execute_commands(token, cursor, &[Command::item_uncomplete(task_id)])
            .await
    }

    /// Delete a task via an `item_delete` command.
    pub async fn delete_task(
        &self,
        token: &AccessToken,
        cursor: &SyncCursor,
        task_id: &str,
    ) -> Result<SyncResponse, ApiError> {
        self.execute_commands(token, cursor, &[Command::item_delete(task_id)])
            .await
    }

    /// Fetch the completed-task history.
    pub async fn completed_tasks(&self, token: &AccessToken) -> Result<CompletedResponse, ApiError> {
        Self::send_json(self.request(Method::GET, self.url(COMPLETED_TASKS_PATH)?, token)).await
    }

    /// Fetch one page of the activity log.
    pub async fn activity_log(&self, token: &AccessToken, query: &ActivityQuery) -> Result<ActivityResponse, ApiError> {
        let pairs = query.to_query_pairs();
        let request = self.request(Method::GET, self.url(ACTIVITY_LOG_PATH)?, token).query(&pairs);
        Self::send_json(request).await
    }
}

fn check_command_status(response: &SyncResponse, command: &Command) -> Result<(), ApiError> {
    match response.sync_status.get(&command.uuid) {
        Some(Value::String(status)) if status == "ok" => Ok(()),
        Some(Value::Object(detail)) => Err(ApiError::Command {
            error_code: detail.get("error_code").and_then(Value::as_i64).unwrap_or_default(),
            message: detail
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(crate::constants::ERROR_UNKNOWN)
                .to_string(),
        }),
        Some(other) => Err(ApiError::Decode(format!(
            "unexpected status for command {}: {other}",
            command.kind
        ))),
        None => Err(ApiError::Decode(format!("no status returned for command {}", command.kind))),
    }
}
