//! Wire types for the Todoist REST v2 and Sync v9 APIs.
//!
//! These mirror the JSON the service sends and are converted into
//! [`crate::task::Task`] by the backend layer; nothing here enters
//! application state directly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::constants::{ACTIVITY_DEFAULT_LIMIT, ACTIVITY_DEFAULT_PAGE};

/// Todoist ids are strings in most payloads but plain integers in the activity log.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

fn default_priority() -> i64 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Due {
    pub date: String,
    #[serde(default)]
    pub string: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Task as returned by the REST v2 endpoints (create, update, get).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RestTask {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Item as returned by the Sync v9 endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SyncItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Response of a sync call, for both full syncs and command batches.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub sync_token: Option<String>,
    #[serde(default)]
    pub items: Vec<SyncItem>,
    /// Per-command outcome keyed by command uuid: `"ok"` or an error object
    #[serde(default)]
    pub sync_status: HashMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CompletedItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CompletedResponse {
    #[serde(default)]
    pub items: Vec<CompletedItem>,
}

/// Event types recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEventType {
    Added,
    Updated,
    Deleted,
    Completed,
    Uncompleted,
    Archived,
    Unarchived,
    Shared,
    Left,
}

impl ActivityEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityEventType::Added => "added",
            ActivityEventType::Updated => "updated",
            ActivityEventType::Deleted => "deleted",
            ActivityEventType::Completed => "completed",
            ActivityEventType::Uncompleted => "uncompleted",
            ActivityEventType::Archived => "archived",
            ActivityEventType::Unarchived => "unarchived",
            ActivityEventType::Shared => "shared",
            ActivityEventType::Left => "left",
        }
    }
}

impl fmt::Display for ActivityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_lowercase())).map_err(|_| format!("unknown event type: {s}"))
    }
}

/// Object kinds the activity log can be filtered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityObjectType {
    Item,
    Note,
    Project,
}

impl ActivityObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityObjectType::Item => "item",
            ActivityObjectType::Note => "note",
            ActivityObjectType::Project => "project",
        }
    }
}

impl std::str::FromStr for ActivityObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_lowercase())).map_err(|_| format!("unknown object type: {s}"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ActivityExtraData {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ActivityEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub event_type: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub extra_data: ActivityExtraData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActivityResponse {
    #[serde(default)]
    pub events: Vec<ActivityEvent>,
}

/// Filters and paging for the activity log.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityQuery {
    pub page: u32,
    pub limit: u32,
    pub event_type: Option<ActivityEventType>,
    pub object_type: Option<ActivityObjectType>,
    pub object_id: Option<String>,
    pub parent_project_id: Option<String>,
    pub parent_item_id: Option<String>,
    pub initiator_id: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page: ACTIVITY_DEFAULT_PAGE,
            limit: ACTIVITY_DEFAULT_LIMIT,
            event_type: None,
            object_type: None,
            object_id: None,
            parent_project_id: None,
            parent_item_id: None,
            initiator_id: None,
        }
    }
}

impl ActivityQuery {
    /// Query string pairs, always including `page` and `limit`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];

        if let Some(event_type) = self.event_type {
            pairs.push(("event_type", event_type.as_str().to_string()));
        }
        if let Some(object_type) = self.object_type {
            pairs.push(("object_type", object_type.as_str().to_string()));
        }
        let optional = [
            ("object_id", &self.object_id),
            ("parent_project_id", &self.parent_project_id),
            ("parent_item_id", &self.parent_item_id),
            ("initiator_id", &self.initiator_id),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                pairs.push((name, value.clone()));
            }
        }
        pairs
    }
}

/// Body for `POST /rest/v2/tasks`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreateTaskArgs {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Body for `POST /rest/v2/tasks/{id}`. Unset fields are left alone by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateTaskArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Which due field a user-supplied due value belongs in.
pub enum DueField {
    Date(String),
    DateTime(String),
    Natural(String),
}

impl DueField {
    pub fn classify(value: &str) -> Self {
        let value = value.trim();
        if crate::utils::datetime::parse_date(value).is_ok() {
            DueField::Date(value.to_string())
        } else if crate::utils::datetime::parse_day(value).is_some() {
            DueField::DateTime(value.to_string())
        } else {
            DueField::Natural(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_event_accepts_numeric_ids() {
        let json = r#"{
            "id": 955333384,
            "event_type": "completed",
            "object_type": "item",
            "object_id": "2995104339",
            "event_date": "2024-03-01T15:30:00Z",
            "extra_data": {"content": "Buy milk", "due_date": "2024-03-02T09:00:00Z"}
        }"#;
        let event: ActivityEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "955333384");
        assert_eq!(event.extra_data.content.as_deref(), Some("Buy milk"));
    }

    #[test]
    fn test_activity_query_pairs() {
        let query = ActivityQuery {
            event_type: Some(ActivityEventType::Completed),
            object_id: Some("42".to_string()),
            ..Default::default()
        };
        let pairs = query.to_query_pairs();
        assert_eq!(pairs[0], ("page", "0".to_string()));
        assert_eq!(pairs[1], ("limit", "30".to_string()));
        assert!(pairs.contains(&("event_type", "completed".to_string())));
        assert!(pairs.contains(&("object_id", "42".to_string())));
        assert!(!pairs.iter().any(|(name, _)| *name == "initiator_id"));
    }

    #[test]
    fn test_create_args_skip_unset_fields() {
        let args = CreateTaskArgs {
            content: "Write report".to_string(),
            priority: Some(4),
            ..Default::default()
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({"content": "Write report", "priority": 4}));
    }

    #[test]
    fn test_due_field_classification() {
        assert!(matches!(DueField::classify("2024-03-01"), DueField::Date(_)));
        assert!(matches!(DueField::classify("2024-03-01T15:30:00"), DueField::DateTime(_)));
        assert!(matches!(DueField::classify("every monday"), DueField::Natural(_)));
    }
}
