//! Typed accessors for the well-known storage keys.

use anyhow::{Context, Result};
use log::warn;
use sea_orm::TransactionTrait;

use super::db::LocalStorage;
use crate::constants::{KEY_ACCESS_TOKEN, KEY_SYNC_CURSOR};
use crate::repositories::KvRepository;
use crate::task::Task;
use crate::todoist::{AccessToken, SyncCursor};

impl LocalStorage {
    /// Read the bearer credential. Blank values count as absent.
    pub async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .get(KEY_ACCESS_TOKEN)
            .await?
            .filter(|token| !token.trim().is_empty())
            .map(AccessToken::new))
    }

    pub async fn set_access_token(&self, token: &AccessToken) -> Result<()> {
        self.set(KEY_ACCESS_TOKEN, token.expose()).await
    }

    pub async fn clear_access_token(&self) -> Result<()> {
        self.remove(KEY_ACCESS_TOKEN).await
    }

    /// Read the cursor returned by the last full sync.
    pub async fn sync_cursor(&self) -> Result<Option<SyncCursor>> {
        Ok(self
            .get(KEY_SYNC_CURSOR)
            .await?
            .filter(|cursor| !cursor.is_empty())
            .map(SyncCursor::new))
    }

    pub async fn set_sync_cursor(&self, cursor: &SyncCursor) -> Result<()> {
        self.set(KEY_SYNC_CURSOR, cursor.as_str()).await
    }

    /// Load a serialized task list. A corrupt list is logged and read as empty.
    pub async fn load_tasks(&self, key: &str) -> Result<Vec<Task>> {
        let Some(raw) = self.get(key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                warn!("⚠️  Discarding unreadable task list under '{key}': {e}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn save_tasks(&self, key: &str, tasks: &[Task]) -> Result<()> {
        self.set(key, &encode_tasks(key, tasks)?).await
    }

    /// Save several task lists in one transaction: either all land or none do.
    pub async fn save_task_lists(&self, lists: &[(&str, &[Task])]) -> Result<()> {
        let txn = self.conn.begin().await.context("Failed to start transaction")?;
        for (key, tasks) in lists {
            KvRepository::set(&txn, key, &encode_tasks(key, tasks)?).await?;
        }
        txn.commit().await.context("Failed to commit task lists")?;
        Ok(())
    }
}

fn encode_tasks(key: &str, tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).with_context(|| format!("Failed to serialize tasks for '{key}'"))
}
