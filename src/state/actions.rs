use std::fmt;

use crate::task::Task;
use crate::todoist::SyncCursor;

/// Identifies one dispatched request. Ids grow monotonically per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The asynchronous remote operations the reducer knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTask,
    UpdateTask,
    CloseTask,
    ReopenTask,
    DeleteTask,
    FetchCompleted,
    FetchTask,
    FullSync,
    FetchActivity,
}

impl Operation {
    /// Whether a success overwrites a whole slice with a fresh snapshot.
    ///
    /// Only these operations can go stale: a later request of the same kind
    /// makes an earlier response obsolete.
    pub fn replaces_snapshot(self) -> bool {
        matches!(
            self,
            Operation::FetchCompleted | Operation::FetchTask | Operation::FullSync | Operation::FetchActivity
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateTask => "tasks/createTask",
            Operation::UpdateTask => "tasks/updateTaskContent",
            Operation::CloseTask => "tasks/closeTask",
            Operation::ReopenTask => "tasks/reopenTask",
            Operation::DeleteTask => "tasks/deleteTask",
            Operation::FetchCompleted => "todoist/getCompletedTasks",
            Operation::FetchTask => "todoist/getActivityTaskById",
            Operation::FullSync => "todoist/syncTasks",
            Operation::FetchActivity => "activity/getActivityLog",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a successful operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Created(Task),
    Updated(Task),
    Closed { task_id: String },
    Reopened { task_id: String },
    Deleted { task_id: String },
    CompletedFetched(Vec<Task>),
    TaskFetched(Task),
    /// Live tasks plus the cursor that scopes later commands to this snapshot
    Synced { tasks: Vec<Task>, cursor: SyncCursor },
    ActivityFetched(Vec<Task>),
}

impl Outcome {
    pub fn operation(&self) -> Operation {
        match self {
            Outcome::Created(_) => Operation::CreateTask,
            Outcome::Updated(_) => Operation::UpdateTask,
            Outcome::Closed { .. } => Operation::CloseTask,
            Outcome::Reopened { .. } => Operation::ReopenTask,
            Outcome::Deleted { .. } => Operation::DeleteTask,
            Outcome::CompletedFetched(_) => Operation::FetchCompleted,
            Outcome::TaskFetched(_) => Operation::FetchTask,
            Outcome::Synced { .. } => Operation::FullSync,
            Outcome::ActivityFetched(_) => Operation::FetchActivity,
        }
    }
}

/// State transitions fed to [`super::reduce`].
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Pending {
        op: Operation,
        request: RequestId,
    },
    Fulfilled {
        request: RequestId,
        outcome: Outcome,
    },
    Rejected {
        op: Operation,
        request: RequestId,
        /// Human-readable reason, when the failure carried one
        message: Option<String>,
    },
    Cancelled {
        op: Operation,
        request: RequestId,
    },
}
