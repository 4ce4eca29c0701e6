use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::runtime::types::{TaskId, TaskRecord, TaskStatus};

/// What the store keeps per task; snapshotted into [`TaskRecord`] on read.
#[derive(Debug)]
struct TaskEntry {
    status: TaskStatus,
    result: Option<Value>,
    error: Option<String>,
}

impl TaskEntry {
    fn pending() -> Self {
        Self {
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// Centralized, thread-safe lifecycle/result store for all tasks.
///
/// Uses a `tokio::sync::RwLock<HashMap>` so many status pollers can read
/// concurrently while workers write.  Each write replaces status and payload
/// together, so a reader never observes a half-applied update.
///
/// Transitions only move forward (`PENDING → STARTED → SUCCESS | FAILURE`);
/// an attempt to move a record backwards is logged and ignored.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<HashMap<TaskId, TaskEntry>>>,
}

impl ResultStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the record for `task_id`.
    ///
    /// An unknown handle reads as a fresh `PENDING` record, never an error:
    /// the store cannot distinguish "not yet started" from "handle never
    /// issued", and callers must tolerate that ambiguity.
    pub async fn get(&self, task_id: &str) -> TaskRecord {
        let guard = self.inner.read().await;
        match guard.get(task_id) {
            Some(entry) => TaskRecord {
                task_id: task_id.to_owned(),
                status: entry.status,
                result: entry.result.clone(),
                error: entry.error.clone(),
            },
            None => TaskRecord::pending(task_id),
        }
    }

    /// Number of records currently tracked.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Insert a provisional `PENDING` record at submission time.
    pub(crate) async fn insert_pending(&self, task_id: &str) {
        self.inner
            .write()
            .await
            .insert(task_id.to_owned(), TaskEntry::pending());
    }

    /// Drop the record for a submission the queue rejected.
    pub(crate) async fn remove(&self, task_id: &str) {
        self.inner.write().await.remove(task_id);
    }

    /// Worker picked the task up.
    pub(crate) async fn mark_started(&self, task_id: &str) {
        self.transition(task_id, TaskStatus::Started, None, None)
            .await;
    }

    /// Handler completed; `result` becomes the record's payload.
    pub(crate) async fn mark_success(&self, task_id: &str, result: Value) {
        self.transition(task_id, TaskStatus::Success, Some(result), None)
            .await;
    }

    /// Handler failed or crashed; `error` describes why.
    pub(crate) async fn mark_failure(&self, task_id: &str, error: String) {
        self.transition(task_id, TaskStatus::Failure, None, Some(error))
            .await;
    }

    async fn transition(
        &self,
        task_id: &str,
        next: TaskStatus,
        result: Option<Value>,
        error: Option<String>,
    ) {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(task_id.to_owned())
            .or_insert_with(TaskEntry::pending);
        if rank(next) <= rank(entry.status) {
            warn!(
                task_id = %task_id,
                from = entry.status.as_str(),
                to = next.as_str(),
                "ignoring backward task transition"
            );
            return;
        }
        entry.status = next;
        entry.result = result;
        entry.error = error;
    }
}

/// Position in the forward-only state machine; terminal states share a rank
/// so neither can overwrite the other.
fn rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Started => 1,
        TaskStatus::Success | TaskStatus::Failure => 2,
    }
}
