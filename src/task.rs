//! Unified task model shared by the local store and the remote slices.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Errors raised while validating task input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("Invalid priority: {0} (expected 1-4)")]
    InvalidPriority(String),

    #[error("No changes given for task {0}")]
    NoChanges(String),

    #[error("Unrecognised due date: {0} (expected YYYY-MM-DD or a date and time)")]
    InvalidDueDate(String),
}

/// Task priority, encoded as the strings `"1"` through `"4"`.
///
/// Todoist counts upwards: `"1"` is the default and `"4"` is the most urgent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    #[default]
    Normal,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric level as used by the Todoist API (1-4).
    pub fn level(self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }

    pub fn from_level(level: i64) -> Result<Self, TaskError> {
        match level {
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            4 => Ok(Priority::Urgent),
            other => Err(TaskError::InvalidPriority(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "1",
            Priority::Medium => "2",
            Priority::High => "3",
            Priority::Urgent => "4",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| TaskError::InvalidPriority(s.to_string()))
            .and_then(Priority::from_level)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Priority::from_level(n).map_err(serde::de::Error::custom),
        }
    }
}

/// A task as seen by the application, regardless of where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// Midnight of the due day; time-of-day is never kept.
    #[serde(default)]
    pub scheduled_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Input for creating a task, locally or remotely.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    /// Due date in any form Todoist accepts (`2024-03-01`, `2024-03-01T15:30:00`)
    pub due_date: Option<String>,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject drafts whose name is blank once trimmed.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        Ok(())
    }
}

/// Partial update for an existing task. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.due_date.is_none() && self.priority.is_none()
    }

    pub fn validate(&self, task_id: &str) -> Result<(), TaskError> {
        if self.is_empty() {
            return Err(TaskError::NoChanges(task_id.to_string()));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(TaskError::EmptyName);
        }
        Ok(())
    }
}
