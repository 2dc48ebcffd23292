use anyhow::Result;
use log::info;

use crate::state::{Operation, Outcome};
use crate::sync::SyncService;
use crate::task::{TaskChanges, TaskDraft};
use crate::todoist::{ActivityQuery, ApiError, SyncCursor};

impl SyncService {
    /// The cursor from the last full sync. Batch commands cannot run without one.
    async fn cursor(&self) -> Result<SyncCursor> {
        match self.storage.sync_cursor().await? {
            Some(cursor) => Ok(cursor),
            None => Err(ApiError::MissingCursor.into()),
        }
    }

    /// Creates a task remotely and appends the service's copy to `tasks`.
    ///
    /// # Errors
    /// Returns an error if the draft is invalid, no credential is stored or
    /// the backend call fails; the reducer records the message either way.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::CreateTask, |token| async move {
            draft.validate()?;
            let task = backend.create_task(&token, &draft).await?;
            info!("✅ Task created: {}", task.id);
            Ok(Outcome::Created(task))
        })
        .await
    }

    /// Updates a task's content and replaces the matching entry in `tasks`.
    pub async fn update_task(&self, task_id: &str, changes: TaskChanges) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::UpdateTask, |token| async move {
            changes.validate(task_id)?;
            let task = backend.update_task(&token, task_id, &changes).await?;
            Ok(Outcome::Updated(task))
        })
        .await
    }

    /// Marks a task complete. Callers usually leave the detail view afterwards.
    pub async fn close_task(&self, task_id: &str) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::CloseTask, |token| async move {
            backend.close_task(&token, task_id).await?;
            info!("✅ Task completed: {task_id}");
            Ok(Outcome::Closed {
                task_id: task_id.to_string(),
            })
        })
        .await
    }

    /// Reopens a completed task with an `item_uncomplete` command scoped to the stored cursor.
    pub async fn reopen_task(&self, task_id: &str) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::ReopenTask, |token| async move {
            let cursor = self.cursor().await?;
            backend.reopen_task(&token, &cursor, task_id).await?;
            info!("✅ Task reopened: {task_id}");
            Ok(Outcome::Reopened {
                task_id: task_id.to_string(),
            })
        })
        .await
    }

    /// Deletes a task with an `item_delete` command scoped to the stored cursor.
    pub async fn delete_task(&self, task_id: &str) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::DeleteTask, |token| async move {
            let cursor = self.cursor().await?;
            backend.delete_task(&token, &cursor, task_id).await?;
            info!("✅ Task deleted: {task_id}");
            Ok(Outcome::Deleted {
                task_id: task_id.to_string(),
            })
        })
        .await
    }

    /// Replaces `completed_tasks` with the full completed history.
    pub async fn fetch_completed_tasks(&self) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::FetchCompleted, |token| async move {
            let tasks = backend.fetch_completed_tasks(&token).await?;
            Ok(Outcome::CompletedFetched(tasks))
        })
        .await
    }

    /// Fetches one task for the detail view into `selected_activity_task`.
    pub async fn fetch_task(&self, task_id: &str) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::FetchTask, |token| async move {
            let task = backend.fetch_task(&token, task_id).await?;
            Ok(Outcome::TaskFetched(task))
        })
        .await
    }

    /// Performs a full sync, replacing `tasks` wholesale.
    ///
    /// The returned cursor is stored only if this snapshot is the one that
    /// lands in state; a superseded sync leaves the stored cursor alone.
    pub async fn full_sync(&self) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::FullSync, |token| async move {
            info!("🔄 Starting full sync...");
            let sync = backend.full_sync(&token).await?;
            info!("✅ Synced {} tasks", sync.tasks.len());
            Ok(Outcome::Synced {
                tasks: sync.tasks,
                cursor: sync.cursor,
            })
        })
        .await
    }

    /// Fetches one page of the activity log into `productivity_tasks`.
    pub async fn fetch_activity(&self, query: ActivityQuery) -> Result<Outcome> {
        let backend = &self.backend;
        self.run(Operation::FetchActivity, |token| async move {
            let tasks = backend.fetch_activity(&token, &query).await?;
            Ok(Outcome::ActivityFetched(tasks))
        })
        .await
    }
}
