//! Backend abstraction layer.
//!
//! This module defines the interface the sync service drives for every
//! remote operation. Implementations translate intents into calls against a
//! task service and normalize the responses into [`Task`]s.

use async_trait::async_trait;

use crate::task::{Task, TaskChanges, TaskDraft};
use crate::todoist::{AccessToken, ActivityQuery, ApiError, SyncCursor};

pub mod factory;
pub mod todoist;

/// Result of a full sync: the live task list plus the cursor to scope later commands.
#[derive(Clone, Debug, PartialEq)]
pub struct FullSync {
    pub tasks: Vec<Task>,
    pub cursor: SyncCursor,
}

/// Remote task service operations.
///
/// The credential and, for batch commands, the sync cursor are passed in on
/// every call; implementations hold neither.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier (e.g., "todoist").
    fn backend_type(&self) -> &str;

    async fn create_task(&self, token: &AccessToken, draft: &TaskDraft) -> Result<Task, ApiError>;
    async fn update_task(&self, token: &AccessToken, task_id: &str, changes: &TaskChanges) -> Result<Task, ApiError>;
    async fn close_task(&self, token: &AccessToken, task_id: &str) -> Result<(), ApiError>;
    async fn reopen_task(&self, token: &AccessToken, cursor: &SyncCursor, task_id: &str) -> Result<(), ApiError>;
    async fn delete_task(&self, token: &AccessToken, cursor: &SyncCursor, task_id: &str) -> Result<(), ApiError>;

    async fn fetch_completed_tasks(&self, token: &AccessToken) -> Result<Vec<Task>, ApiError>;
    async fn fetch_task(&self, token: &AccessToken, task_id: &str) -> Result<Task, ApiError>;
    async fn full_sync(&self, token: &AccessToken) -> Result<FullSync, ApiError>;
    async fn fetch_activity(&self, token: &AccessToken, query: &ActivityQuery) -> Result<Vec<Task>, ApiError>;
}
