#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use zest::backend::{Backend, FullSync};
use zest::storage::LocalStorage;
use zest::sync::SyncService;
use zest::todoist::{AccessToken, ActivityQuery, ApiError, ErrorBody, SyncCursor};
use zest::{Priority, Task, TaskChanges, TaskDraft};

pub fn task(id: &str, name: &str) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(String::new()),
        completed: false,
        scheduled_date: None,
        priority: Priority::Normal,
        created_at: None,
        completed_at: None,
    }
}

/// One scripted full-sync answer: wait `delay`, then return `tasks` at `cursor`.
pub struct SyncStep {
    pub delay: Duration,
    pub tasks: Vec<Task>,
    pub cursor: String,
}

/// In-process backend that records calls and answers from canned data.
#[derive(Default)]
pub struct FakeBackend {
    pub synced: Mutex<Vec<Task>>,
    pub cursor: Mutex<String>,
    pub completed: Mutex<Vec<Task>>,
    pub activity: Mutex<Vec<Task>>,
    /// When set, every call fails with this HTTP status and plain-text body
    pub fail_status: Mutex<Option<(u16, String)>>,
    pub delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,
    pub tokens: Mutex<Vec<String>>,
    pub cursors: Mutex<Vec<String>>,
    /// Consumed in call order by `full_sync` before falling back to `synced`
    pub sync_script: Mutex<VecDeque<SyncStep>>,
}

impl FakeBackend {
    pub fn with_sync(tasks: Vec<Task>, cursor: &str) -> Self {
        let backend = Self::default();
        *backend.synced.lock().unwrap() = tasks;
        *backend.cursor.lock().unwrap() = cursor.to_string();
        backend
    }

    pub fn fail_with(&self, status: u16, body: &str) {
        *self.fail_status.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn delay_by(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn script_sync(&self, delay: Duration, tasks: Vec<Task>, cursor: &str) {
        self.sync_script.lock().unwrap().push_back(SyncStep {
            delay,
            tasks,
            cursor: cursor.to_string(),
        });
    }

    /// Poll until the backend has seen `count` calls.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..200 {
            if self.calls.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("backend never reached {count} calls");
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn cursors(&self) -> Vec<String> {
        self.cursors.lock().unwrap().clone()
    }

    async fn enter(&self, name: &str, token: &AccessToken) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(name.to_string());
        self.tokens.lock().unwrap().push(token.expose().to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.fail_status.lock().unwrap().clone();
        match failure {
            Some((status, body)) => Err(ApiError::Status {
                status: reqwest::StatusCode::from_u16(status).unwrap(),
                body: ErrorBody::parse(&body),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn backend_type(&self) -> &str {
        "fake"
    }

    async fn create_task(&self, token: &AccessToken, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.enter("create_task", token).await?;
        let mut created = task("900", draft.name.trim());
        created.description = draft.description.clone();
        created.priority = draft.priority;
        Ok(created)
    }

    async fn update_task(&self, token: &AccessToken, task_id: &str, changes: &TaskChanges) -> Result<Task, ApiError> {
        self.enter("update_task", token).await?;
        let mut updated = task(task_id, changes.name.as_deref().unwrap_or("unchanged"));
        if let Some(priority) = changes.priority {
            updated.priority = priority;
        }
        Ok(updated)
    }

    async fn close_task(&self, token: &AccessToken, _task_id: &str) -> Result<(), ApiError> {
        self.enter("close_task", token).await
    }

    async fn reopen_task(&self, token: &AccessToken, cursor: &SyncCursor, _task_id: &str) -> Result<(), ApiError> {
        self.enter("reopen_task", token).await?;
        self.cursors.lock().unwrap().push(cursor.to_string());
        Ok(())
    }

    async fn delete_task(&self, token: &AccessToken, cursor: &SyncCursor, _task_id: &str) -> Result<(), ApiError> {
        self.enter("delete_task", token).await?;
        self.cursors.lock().unwrap().push(cursor.to_string());
        Ok(())
    }

    async fn fetch_completed_tasks(&self, token: &AccessToken) -> Result<Vec<Task>, ApiError> {
        self.enter("fetch_completed_tasks", token).await?;
        Ok(self.completed.lock().unwrap().clone())
    }

    async fn fetch_task(&self, token: &AccessToken, task_id: &str) -> Result<Task, ApiError> {
        self.enter("fetch_task", token).await?;
        Ok(task(task_id, "fetched"))
    }

    async fn full_sync(&self, token: &AccessToken) -> Result<FullSync, ApiError> {
        let step = self.sync_script.lock().unwrap().pop_front();
        self.enter("full_sync", token).await?;
        if let Some(step) = step {
            tokio::time::sleep(step.delay).await;
            return Ok(FullSync {
                tasks: step.tasks,
                cursor: SyncCursor::new(step.cursor),
            });
        }
        Ok(FullSync {
            tasks: self.synced.lock().unwrap().clone(),
            cursor: SyncCursor::new(self.cursor.lock().unwrap().clone()),
        })
    }

    async fn fetch_activity(&self, token: &AccessToken, _query: &ActivityQuery) -> Result<Vec<Task>, ApiError> {
        self.enter("fetch_activity", token).await?;
        Ok(self.activity.lock().unwrap().clone())
    }
}

/// A service over fresh in-memory storage, optionally signed in.
pub async fn service(backend: Arc<FakeBackend>, token: Option<&str>) -> SyncService {
    let storage = LocalStorage::in_memory().await.unwrap();
    if let Some(token) = token {
        storage.set_access_token(&AccessToken::new(token)).await.unwrap();
    }
    SyncService::new(backend, storage, None).await.unwrap()
}
