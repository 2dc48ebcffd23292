//! Intent routing between the remote service and the offline list.
//!
//! A stored credential selects the remote path; without one every intent
//! goes to the [`LocalTaskStore`]. The two lists are never merged.

use anyhow::Result;
use log::info;

use crate::local::LocalTaskStore;
use crate::state::Outcome;
use crate::sync::SyncService;
use crate::task::{Task, TaskChanges, TaskDraft};
use crate::todoist::AccessToken;

/// Where an intent was carried out.
#[derive(Clone, Debug, PartialEq)]
pub enum Routed {
    Remote(Outcome),
    Local(Task),
}

pub struct Workspace {
    sync: SyncService,
    local: LocalTaskStore,
}

impl Workspace {
    /// Open the workspace over the sync service's storage.
    pub async fn open(sync: SyncService) -> Result<Self> {
        let local = LocalTaskStore::load(sync.storage().clone()).await?;
        Ok(Self { sync, local })
    }

    pub fn sync(&self) -> &SyncService {
        &self.sync
    }

    pub fn local(&self) -> &LocalTaskStore {
        &self.local
    }

    /// Store a credential; subsequent intents go to the remote service.
    pub async fn login(&self, token: &AccessToken) -> Result<()> {
        self.sync.storage().set_access_token(token).await?;
        info!("🔑 Access token stored");
        Ok(())
    }

    /// Forget the credential; subsequent intents go to the local list.
    pub async fn logout(&self) -> Result<()> {
        self.sync.storage().clear_access_token().await?;
        info!("🔒 Access token cleared");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        self.sync.is_authenticated().await
    }

    /// The live list for the current mode.
    pub async fn visible_tasks(&self) -> Result<Vec<Task>> {
        if self.is_authenticated().await? {
            Ok(self.sync.state().tasks)
        } else {
            Ok(self.local.tasks().to_vec())
        }
    }

    pub async fn add_task(&mut self, draft: TaskDraft) -> Result<Routed> {
        if self.is_authenticated().await? {
            Ok(Routed::Remote(self.sync.create_task(draft).await?))
        } else {
            Ok(Routed::Local(self.local.add(draft).await?))
        }
    }

    pub async fn update_task(&mut self, task_id: &str, changes: TaskChanges) -> Result<Routed> {
        if self.is_authenticated().await? {
            Ok(Routed::Remote(self.sync.update_task(task_id, changes).await?))
        } else {
            Ok(Routed::Local(self.local.update(task_id, changes).await?))
        }
    }

    pub async fn complete_task(&mut self, task_id: &str) -> Result<Routed> {
        if self.is_authenticated().await? {
            Ok(Routed::Remote(self.sync.close_task(task_id).await?))
        } else {
            Ok(Routed::Local(self.local.complete(task_id).await?))
        }
    }

    pub async fn reopen_task(&mut self, task_id: &str) -> Result<Routed> {
        if self.is_authenticated().await? {
            Ok(Routed::Remote(self.sync.reopen_task(task_id).await?))
        } else {
            Ok(Routed::Local(self.local.reopen(task_id).await?))
        }
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<Routed> {
        if self.is_authenticated().await? {
            Ok(Routed::Remote(self.sync.delete_task(task_id).await?))
        } else {
            Ok(Routed::Local(self.local.remove(task_id).await?))
        }
    }
}
