//! Application state and its reducer.
//!
//! [`AppState`] is the single authoritative container for the remote
//! slices. Every asynchronous operation moves it through the same
//! pending → fulfilled | rejected protocol via [`reduce`]; slices are only
//! touched after a confirmed success, so there is nothing to roll back.
//!
//! Concurrent requests of *different* kinds each touch their own slice.
//! For requests of the *same* snapshot-replacing kind, only the most
//! recently issued one may land; earlier completions are dropped as stale.
//! Cancelling that newest request hands the slot back to the newest one
//! still running.

pub mod actions;

use log::debug;
use std::collections::HashMap;

pub use actions::{Action, Operation, Outcome, RequestId};

use crate::constants::ERROR_UNKNOWN;
use crate::task::Task;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Live tasks from the last full sync, plus local confirmations since
    pub tasks: Vec<Task>,
    /// Completed-task history (read-only)
    pub completed_tasks: Vec<Task>,
    /// Activity-log summaries (read-only)
    pub productivity_tasks: Vec<Task>,
    /// Task fetched for the detail view
    pub selected_activity_task: Option<Task>,
    pub loading: bool,
    pub error: Option<String>,

    latest: HashMap<Operation, RequestId>,
    in_flight: HashMap<RequestId, Operation>,
}

impl AppState {
    /// Start from previously persisted remote snapshots.
    pub fn restored(tasks: Vec<Task>, completed_tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            completed_tasks,
            ..Default::default()
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn is_stale(&self, op: Operation, request: RequestId) -> bool {
        op.replaces_snapshot() && self.latest.get(&op).is_some_and(|latest| *latest != request)
    }

    fn settle(&mut self, request: RequestId) {
        self.in_flight.remove(&request);
        self.loading = !self.in_flight.is_empty();
    }

    /// Hand the `latest` mark back to the newest request of `op` still running.
    fn release_latest(&mut self, op: Operation, request: RequestId) {
        if self.latest.get(&op) != Some(&request) {
            return;
        }
        let newest = self
            .in_flight
            .iter()
            .filter(|(_, pending)| **pending == op)
            .map(|(id, _)| *id)
            .max();
        match newest {
            Some(id) => self.latest.insert(op, id),
            None => self.latest.remove(&op),
        };
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created(task) => self.tasks.push(task),
            Outcome::Updated(updated) => {
                if let Some(slot) = self.tasks.iter_mut().find(|task| task.id == updated.id) {
                    *slot = updated;
                }
            }
            Outcome::Closed { .. } | Outcome::Reopened { .. } | Outcome::Deleted { .. } => {}
            Outcome::CompletedFetched(tasks) => self.completed_tasks = tasks,
            Outcome::TaskFetched(task) => self.selected_activity_task = Some(task),
            Outcome::Synced { tasks, .. } => self.tasks = tasks,
            Outcome::ActivityFetched(tasks) => self.productivity_tasks = tasks,
        }
    }
}

/// Apply one action. Returns `false` when the action was dropped as stale.
pub fn reduce(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::Pending { op, request } => {
            state.latest.insert(op, request);
            state.in_flight.insert(request, op);
            state.loading = true;
            state.error = None;
            true
        }
        Action::Fulfilled { request, outcome } => {
            let op = outcome.operation();
            state.settle(request);
            if state.is_stale(op, request) {
                debug!("Dropping stale {op} response {request}");
                return false;
            }
            state.apply(outcome);
            true
        }
        Action::Rejected { op, request, message } => {
            state.settle(request);
            if state.is_stale(op, request) {
                debug!("Dropping stale {op} failure {request}");
                return false;
            }
            state.error = Some(
                message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| ERROR_UNKNOWN.to_string()),
            );
            true
        }
        Action::Cancelled { op, request } => {
            debug!("{op} request {request} cancelled");
            state.settle(request);
            state.release_latest(op, request);
            true
        }
    }
}
