//! Synchronization service module for zest.
//!
//! This module provides the [`SyncService`] struct which drives every remote
//! operation through the state reducer. For each call it:
//! - dispatches `Pending` and allocates a [`RequestId`]
//! - reads the bearer credential from storage at call time
//! - runs the backend call under the configured timeout
//! - dispatches `Fulfilled` or `Rejected` with the best available message
//! - mirrors changed remote slices and the sync cursor back to storage
//!
//! A snapshot response that lost to a newer request of the same kind is
//! reported as [`ApiError::Superseded`] and leaves state and storage alone.
//!
//! Calls can be awaited directly or spawned as a [`RequestHandle`] that
//! supports cancellation.

pub mod tasks;

use anyhow::Result;
use log::{error, info, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::constants::{KEY_REMOTE_COMPLETED_TASKS, KEY_REMOTE_TASKS};
use crate::state::{reduce, Action, AppState, Operation, Outcome, RequestId};
use crate::storage::LocalStorage;
use crate::task::{TaskChanges, TaskDraft};
use crate::todoist::{AccessToken, ActivityQuery, ApiError};

/// An application intent that needs the remote service.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Create(TaskDraft),
    Update { task_id: String, changes: TaskChanges },
    Close(String),
    Reopen(String),
    Delete(String),
    FetchCompleted,
    FetchTask(String),
    FullSync,
    FetchActivity(ActivityQuery),
}

impl Intent {
    pub fn operation(&self) -> Operation {
        match self {
            Intent::Create(_) => Operation::CreateTask,
            Intent::Update { .. } => Operation::UpdateTask,
            Intent::Close(_) => Operation::CloseTask,
            Intent::Reopen(_) => Operation::ReopenTask,
            Intent::Delete(_) => Operation::DeleteTask,
            Intent::FetchCompleted => Operation::FetchCompleted,
            Intent::FetchTask(_) => Operation::FetchTask,
            Intent::FullSync => Operation::FullSync,
            Intent::FetchActivity(_) => Operation::FetchActivity,
        }
    }
}

/// Service that runs remote operations and owns the application state.
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn Backend>,
    storage: LocalStorage,
    state: Arc<Mutex<AppState>>,
    next_request: Arc<AtomicU64>,
    request_timeout: Option<Duration>,
    /// Held from applying an outcome until its snapshot is written
    persist_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Dispatches `Cancelled` if the request is dropped before it settles.
struct InFlight {
    state: Arc<Mutex<AppState>>,
    op: Operation,
    request: RequestId,
    settled: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            reduce(
                &mut state,
                Action::Cancelled {
                    op: self.op,
                    request: self.request,
                },
            );
        }
    }
}

/// Handle to a spawned request.
pub struct RequestHandle {
    op: Operation,
    handle: JoinHandle<Result<Outcome>>,
}

impl RequestHandle {
    pub fn operation(&self) -> Operation {
        self.op
    }

    /// Abort the request. The state is released as if it never completed.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the outcome. A cancelled request yields [`ApiError::Cancelled`].
    pub async fn join(self) -> Result<Outcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ApiError::Cancelled.into()),
            Err(e) => Err(anyhow::anyhow!("{} task failed: {e}", self.op)),
        }
    }
}

/// Best human-readable message for the error slot.
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.user_message(),
        None => format!("{err:#}"),
    }
}

impl SyncService {
    /// Create a service, restoring the cached remote slices from storage.
    pub async fn new(
        backend: Arc<dyn Backend>,
        storage: LocalStorage,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let tasks = storage.load_tasks(KEY_REMOTE_TASKS).await?;
        let completed = storage.load_tasks(KEY_REMOTE_COMPLETED_TASKS).await?;
        info!(
            "Restored {} cached tasks and {} completed tasks ({} backend)",
            tasks.len(),
            completed.len(),
            backend.backend_type()
        );

        Ok(Self {
            backend,
            storage,
            state: Arc::new(Mutex::new(AppState::restored(tasks, completed))),
            next_request: Arc::new(AtomicU64::new(1)),
            request_timeout,
            persist_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading
    }

    /// Feed one action to the reducer.
    pub fn dispatch(&self, action: Action) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        reduce(&mut state, action)
    }

    /// Whether a credential is currently stored.
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.storage.access_token().await?.is_some())
    }

    async fn credential(&self) -> Result<AccessToken> {
        match self.storage.access_token().await? {
            Some(token) => Ok(token),
            None => Err(ApiError::MissingCredential.into()),
        }
    }

    async fn with_timeout<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout.into()),
            },
            None => call.await,
        }
    }

    /// Run one operation through the pending → fulfilled | rejected protocol.
    async fn run<F, Fut>(&self, op: Operation, call: F) -> Result<Outcome>
    where
        F: FnOnce(AccessToken) -> Fut,
        Fut: Future<Output = Result<Outcome>>,
    {
        let request = RequestId(self.next_request.fetch_add(1, Ordering::Relaxed));
        self.dispatch(Action::Pending { op, request });
        let mut in_flight = InFlight {
            state: Arc::clone(&self.state),
            op,
            request,
            settled: false,
        };

        let result = async {
            let token = self.credential().await?;
            self.with_timeout(call(token)).await
        }
        .await;

        match result {
            Ok(outcome) => {
                let _persisting = self.persist_lock.lock().await;
                let applied = self.dispatch(Action::Fulfilled {
                    request,
                    outcome: outcome.clone(),
                });
                in_flight.settled = true;
                if !applied {
                    warn!("⚠️  {op} response {request} superseded by a newer request");
                    return Err(ApiError::Superseded.into());
                }
                self.persist_snapshots(&outcome).await;
                Ok(outcome)
            }
            Err(e) => {
                let message = failure_message(&e);
                error!("❌ {op} failed: {message}");
                self.dispatch(Action::Rejected {
                    op,
                    request,
                    message: Some(message),
                });
                in_flight.settled = true;
                Err(e)
            }
        }
    }

    /// Mirror what an applied outcome changed into storage.
    async fn persist_snapshots(&self, outcome: &Outcome) {
        let state = self.state();
        let result = match outcome {
            Outcome::Synced { cursor, .. } => {
                async {
                    self.storage.set_sync_cursor(cursor).await?;
                    self.storage.save_tasks(KEY_REMOTE_TASKS, &state.tasks).await
                }
                .await
            }
            Outcome::Created(_) | Outcome::Updated(_) => self.storage.save_tasks(KEY_REMOTE_TASKS, &state.tasks).await,
            Outcome::CompletedFetched(_) => {
                self.storage
                    .save_tasks(KEY_REMOTE_COMPLETED_TASKS, &state.completed_tasks)
                    .await
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("⚠️  Failed to cache {} result: {e:#}", outcome.operation());
        }
    }

    /// Run an intent to completion.
    pub async fn execute(&self, intent: Intent) -> Result<Outcome> {
        match intent {
            Intent::Create(draft) => self.create_task(draft).await,
            Intent::Update { task_id, changes } => self.update_task(&task_id, changes).await,
            Intent::Close(task_id) => self.close_task(&task_id).await,
            Intent::Reopen(task_id) => self.reopen_task(&task_id).await,
            Intent::Delete(task_id) => self.delete_task(&task_id).await,
            Intent::FetchCompleted => self.fetch_completed_tasks().await,
            Intent::FetchTask(task_id) => self.fetch_task(&task_id).await,
            Intent::FullSync => self.full_sync().await,
            Intent::FetchActivity(query) => self.fetch_activity(query).await,
        }
    }

    /// Run an intent on the runtime and return a cancellable handle.
    pub fn spawn(&self, intent: Intent) -> RequestHandle {
        let op = intent.operation();
        let service = self.clone();
        RequestHandle {
            op,
            handle: tokio::spawn(async move { service.execute(intent).await }),
        }
    }
}
