//! Offline task list.
//!
//! Used before a credential exists. Every mutation is written to durable
//! storage, under keys separate from the remote snapshots, before it becomes
//! visible in memory.

use anyhow::Result;
use chrono::NaiveDateTime;
use log::{debug, info};
use uuid::Uuid;

use crate::constants::{KEY_LOCAL_COMPLETED_TASKS, KEY_LOCAL_TASKS};
use crate::storage::LocalStorage;
use crate::task::{Task, TaskChanges, TaskDraft, TaskError};
use crate::utils::datetime::{now_rfc3339, start_of_day};

/// Errors specific to the local task list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocalStoreError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Invalid(#[from] TaskError),
}

pub struct LocalTaskStore {
    storage: LocalStorage,
    tasks: Vec<Task>,
    completed_tasks: Vec<Task>,
    editing_task_id: Option<String>,
}

impl LocalTaskStore {
    /// Load both lists from storage. Missing keys start empty.
    pub async fn load(storage: LocalStorage) -> Result<Self> {
        let tasks = storage.load_tasks(KEY_LOCAL_TASKS).await?;
        let completed_tasks = storage.load_tasks(KEY_LOCAL_COMPLETED_TASKS).await?;
        debug!(
            "Loaded {} local tasks ({} completed)",
            tasks.len(),
            completed_tasks.len()
        );

        Ok(Self {
            storage,
            tasks,
            completed_tasks,
            editing_task_id: None,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed_tasks
    }

    /// The task currently selected for editing, if it still exists.
    pub fn editing(&self) -> Option<&Task> {
        let id = self.editing_task_id.as_deref()?;
        self.tasks.iter().find(|task| task.id == id)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.tasks
            .iter()
            .chain(self.completed_tasks.iter())
            .any(|task| task.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    fn position(list: &[Task], task_id: &str) -> Result<usize, LocalStoreError> {
        list.iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| LocalStoreError::NotFound(task_id.to_string()))
    }

    /// Offline tasks only keep calendar days, so the due value must parse as one.
    fn scheduled(due: &str) -> Result<NaiveDateTime, LocalStoreError> {
        start_of_day(due).ok_or_else(|| TaskError::InvalidDueDate(due.trim().to_string()).into())
    }

    /// Write both lists, then make them current. On failure memory is left as it was.
    async fn commit(&mut self, tasks: Vec<Task>, completed_tasks: Vec<Task>) -> Result<()> {
        self.storage
            .save_task_lists(&[
                (KEY_LOCAL_TASKS, tasks.as_slice()),
                (KEY_LOCAL_COMPLETED_TASKS, completed_tasks.as_slice()),
            ])
            .await?;
        self.tasks = tasks;
        self.completed_tasks = completed_tasks;
        Ok(())
    }

    /// Create a task with a fresh random id.
    pub async fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        draft.validate().map_err(LocalStoreError::from)?;
        let scheduled_date = draft
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|due| !due.is_empty())
            .map(Self::scheduled)
            .transpose()?;

        let task = Task {
            id: self.fresh_id(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            completed: false,
            scheduled_date,
            priority: draft.priority,
            created_at: Some(now_rfc3339()),
            completed_at: None,
        };

        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit(tasks, self.completed_tasks.clone()).await?;
        info!("✅ Local task created: {}", task.id);
        Ok(task)
    }

    /// Apply a partial update to a live task. An empty due value clears the date.
    pub async fn update(&mut self, task_id: &str, changes: TaskChanges) -> Result<Task> {
        changes.validate(task_id).map_err(LocalStoreError::from)?;
        let index = Self::position(&self.tasks, task_id)?;

        let mut task = self.tasks[index].clone();
        if let Some(name) = changes.name {
            task.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        if let Some(due) = changes.due_date {
            task.scheduled_date = match due.trim() {
                "" => None,
                due => Some(Self::scheduled(due)?),
            };
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }

        let mut tasks = self.tasks.clone();
        tasks[index] = task.clone();
        self.commit(tasks, self.completed_tasks.clone()).await?;
        Ok(task)
    }

    /// Delete a task from whichever list holds it.
    pub async fn remove(&mut self, task_id: &str) -> Result<Task> {
        let mut tasks = self.tasks.clone();
        let mut completed_tasks = self.completed_tasks.clone();
        let removed = match Self::position(&tasks, task_id) {
            Ok(index) => tasks.remove(index),
            Err(_) => {
                let index = Self::position(&completed_tasks, task_id)?;
                completed_tasks.remove(index)
            }
        };

        self.commit(tasks, completed_tasks).await?;
        if self.editing_task_id.as_deref() == Some(task_id) {
            self.editing_task_id = None;
        }
        info!("🗑️  Local task removed: {task_id}");
        Ok(removed)
    }

    /// Mark a task done and move it to the completed list.
    pub async fn complete(&mut self, task_id: &str) -> Result<Task> {
        let index = Self::position(&self.tasks, task_id)?;
        let mut tasks = self.tasks.clone();
        let mut task = tasks.remove(index);
        task.completed = true;
        task.completed_at = Some(now_rfc3339());

        let mut completed_tasks = self.completed_tasks.clone();
        completed_tasks.push(task.clone());
        self.commit(tasks, completed_tasks).await?;
        if self.editing_task_id.as_deref() == Some(task_id) {
            self.editing_task_id = None;
        }
        Ok(task)
    }

    /// Move a completed task back to the live list.
    pub async fn reopen(&mut self, task_id: &str) -> Result<Task> {
        let index = Self::position(&self.completed_tasks, task_id)?;
        let mut completed_tasks = self.completed_tasks.clone();
        let mut task = completed_tasks.remove(index);
        task.completed = false;
        task.completed_at = None;

        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit(tasks, completed_tasks).await?;
        Ok(task)
    }

    /// Select a live task for editing.
    pub fn set_editing(&mut self, task_id: &str) -> Result<(), LocalStoreError> {
        Self::position(&self.tasks, task_id)?;
        self.editing_task_id = Some(task_id.to_string());
        Ok(())
    }

    pub fn clear_editing(&mut self) {
        self.editing_task_id = None;
    }
}
