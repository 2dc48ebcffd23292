//! Todoist backend implementation.

use async_trait::async_trait;
use log::info;

use super::{Backend, FullSync};
use crate::constants::{LOG_FETCHED_ACTIVITY, LOG_FETCHED_COMPLETED, LOG_FETCHED_TASKS};
use crate::task::{Priority, Task, TaskChanges, TaskDraft};
use crate::todoist::models::DueField;
use crate::todoist::{
    AccessToken, ActivityEvent, ActivityEventType, ActivityQuery, ApiError, CompletedItem, CreateTaskArgs, RestTask,
    SyncCursor, SyncItem, TodoistClient, UpdateTaskArgs,
};
use crate::utils::datetime::start_of_day;

/// Todoist backend implementation.
pub struct TodoistBackend {
    client: TodoistClient,
}

impl TodoistBackend {
    pub fn new(client: TodoistClient) -> Self {
        Self { client }
    }

    fn priority(level: i64) -> Priority {
        Priority::from_level(level).unwrap_or_default()
    }

    // Helper: REST task → Task
    pub fn rest_task_to_task(api_task: RestTask) -> Task {
        Task {
            id: api_task.id,
            name: api_task.content,
            description: Some(api_task.description),
            completed: api_task.is_completed,
            scheduled_date: api_task.due.as_ref().and_then(|d| start_of_day(&d.date)),
            priority: Self::priority(api_task.priority),
            created_at: api_task.created_at,
            completed_at: None,
        }
    }

    // Helper: sync item → Task. Full syncs only return live items.
    pub fn sync_item_to_task(item: SyncItem) -> Task {
        Task {
            id: item.id,
            name: item.content,
            description: Some(item.description),
            completed: false,
            scheduled_date: item.due.as_ref().and_then(|d| start_of_day(&d.date)),
            priority: Self::priority(item.priority),
            created_at: item.added_at,
            completed_at: item.completed_at,
        }
    }

    // Helper: completed item → Task. The endpoint's reduced schema gets fixed defaults.
    pub fn completed_item_to_task(item: CompletedItem) -> Task {
        Task {
            id: item.id,
            name: item.content,
            description: Some(String::new()),
            completed: true,
            scheduled_date: None,
            priority: Priority::Normal,
            created_at: None,
            completed_at: item.completed_at,
        }
    }

    // Helper: activity event → Task-shaped summary
    pub fn activity_event_to_task(event: ActivityEvent) -> Task {
        Task {
            completed: event.event_type == ActivityEventType::Completed.as_str(),
            id: event.id,
            name: event.extra_data.content.unwrap_or_default(),
            description: Some(String::new()),
            scheduled_date: event.extra_data.due_date.as_deref().and_then(start_of_day),
            priority: Priority::Normal,
            created_at: event.event_date,
            completed_at: None,
        }
    }

    pub fn draft_to_args(draft: &TaskDraft) -> CreateTaskArgs {
        let mut args = CreateTaskArgs {
            content: draft.name.trim().to_string(),
            description: draft.description.clone(),
            priority: Some(i64::from(draft.priority.level())),
            ..Default::default()
        };
        if let Some(due) = &draft.due_date {
            match DueField::classify(due) {
                DueField::Date(date) => args.due_date = Some(date),
                DueField::DateTime(datetime) => args.due_datetime = Some(datetime),
                DueField::Natural(text) => args.due_string = Some(text),
            }
        }
        args
    }

    pub fn changes_to_args(changes: &TaskChanges) -> UpdateTaskArgs {
        let mut args = UpdateTaskArgs {
            content: changes.name.as_ref().map(|name| name.trim().to_string()),
            description: changes.description.clone(),
            priority: changes.priority.map(|p| i64::from(p.level())),
            ..Default::default()
        };
        if let Some(due) = &changes.due_date {
            match DueField::classify(due) {
                DueField::Date(date) => args.due_date = Some(date),
                DueField::DateTime(datetime) => args.due_datetime = Some(datetime),
                DueField::Natural(text) => args.due_string = Some(text),
            }
        }
        args
    }
}

#[async_trait]
impl Backend for TodoistBackend {
    fn backend_type(&self) -> &str {
        "todoist"
    }

    async fn create_task(&self, token: &AccessToken, draft: &TaskDraft) -> Result<Task, ApiError> {
        let task = self.client.create_task(token, &Self::draft_to_args(draft)).await?;
        Ok(Self::rest_task_to_task(task))
    }

    async fn update_task(&self, token: &AccessToken, task_id: &str, changes: &TaskChanges) -> Result<Task, ApiError> {
        let task = self
            .client
            .update_task(token, task_id, &Self::changes_to_args(changes))
            .await?;
        Ok(Self::rest_task_to_task(task))
    }

    async fn close_task(&self, token: &AccessToken, task_id: &str) -> Result<(), ApiError> {
        self.client.close_task(token, task_id).await
    }

    async fn reopen_task(&self, token: &AccessToken, cursor: &SyncCursor, task_id: &str) -> Result<(), ApiError> {
        self.client.reopen_task(token, cursor, task_id).await.map(|_| ())
    }

    async fn delete_task(&self, token: &AccessToken, cursor: &SyncCursor, task_id: &str) -> Result<(), ApiError> {
        self.client.delete_task(token, cursor, task_id).await.map(|_| ())
    }

    async fn fetch_completed_tasks(&self, token: &AccessToken) -> Result<Vec<Task>, ApiError> {
        let response = self.client.completed_tasks(token).await?;
        info!("{LOG_FETCHED_COMPLETED} ({} items)", response.items.len());
        Ok(response
            .items
            .into_iter()
            .map(Self::completed_item_to_task)
            .collect())
    }

    async fn fetch_task(&self, token: &AccessToken, task_id: &str) -> Result<Task, ApiError> {
        let task = self.client.get_task(token, task_id).await?;
        Ok(Self::rest_task_to_task(task))
    }

    async fn full_sync(&self, token: &AccessToken) -> Result<FullSync, ApiError> {
        let response = self.client.full_sync(token).await?;
        let cursor = response
            .sync_token
            .map(SyncCursor::new)
            .ok_or_else(|| ApiError::Decode("sync response carried no sync_token".to_string()))?;

        let tasks: Vec<Task> = response
            .items
            .into_iter()
            .filter(|item| !item.is_deleted)
            .map(Self::sync_item_to_task)
            .collect();
        info!("{LOG_FETCHED_TASKS} ({} items)", tasks.len());

        Ok(FullSync { tasks, cursor })
    }

    async fn fetch_activity(&self, token: &AccessToken, query: &ActivityQuery) -> Result<Vec<Task>, ApiError> {
        let response = self.client.activity_log(token, query).await?;
        info!("{LOG_FETCHED_ACTIVITY} ({} events)", response.events.len());
        Ok(response
            .events
            .into_iter()
            .map(Self::activity_event_to_task)
            .collect())
    }
}
