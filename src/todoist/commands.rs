//! Batch commands for the Sync endpoint and the cursor they are scoped to.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::constants::{COMMAND_ITEM_DELETE, COMMAND_ITEM_UNCOMPLETE, FULL_SYNC_CURSOR};

/// Opaque sync token naming a point-in-time snapshot on the service.
///
/// Callers hold on to the value returned by the last full sync and pass it
/// explicitly into every command batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SyncCursor(String);

impl SyncCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The wildcard cursor requesting a full sync.
    pub fn full() -> Self {
        Self(FULL_SYNC_CURSOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `{type, uuid, args}` envelope posted to the shared sync endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: String,
    pub args: Value,
}

impl Command {
    fn for_item(kind: &str, task_id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            uuid: Uuid::new_v4().to_string(),
            args: serde_json::json!({ "id": task_id }),
        }
    }

    pub fn item_uncomplete(task_id: &str) -> Self {
        Self::for_item(COMMAND_ITEM_UNCOMPLETE, task_id)
    }

    pub fn item_delete(task_id: &str) -> Self {
        Self::for_item(COMMAND_ITEM_DELETE, task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_envelope_shape() {
        let command = Command::item_delete("42");
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], "item_delete");
        assert_eq!(json["args"]["id"], "42");
        assert!(Uuid::parse_str(json["uuid"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_command_uuids_are_fresh() {
        assert_ne!(Command::item_uncomplete("1").uuid, Command::item_uncomplete("1").uuid);
    }
}
