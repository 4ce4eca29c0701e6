use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque handle identifying a submitted task.
///
/// Allocated by [`QueueClient::submit`] (a UUID v4 rendered as a string) and
/// returned to the caller for later status polling.  Immutable once issued.
///
/// [`QueueClient::submit`]: crate::runtime::queue::QueueClient::submit
pub type TaskId = String;

/// Lifecycle state of a task, spelled the way it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Accepted (or never seen); no worker has picked it up yet.
    Pending,
    /// A worker is executing the handler.
    Started,
    /// The handler ran to completion; a result payload is available.
    Success,
    /// The handler returned an error or crashed; an error string is available.
    Failure,
}

impl TaskStatus {
    /// Uppercase wire form, e.g. `"PENDING"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Started => "STARTED",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
        }
    }

    /// Returns `true` once the task can no longer change state.
    ///
    /// Callers that poll until completion should use this rather than
    /// matching individual variants.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

/// Snapshot of a task's state as seen by a status poller.
///
/// `result` is populated only for [`TaskStatus::Success`], `error` only for
/// [`TaskStatus::Failure`]; the two are never set together.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl TaskRecord {
    /// A fresh `PENDING` record for `task_id`.
    pub fn pending(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// A unit of work travelling from the queue client to a worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub task_id: TaskId,
    /// Routing key matched against [`JobHandler::task_type`].
    ///
    /// [`JobHandler::task_type`]: crate::runtime::handler::JobHandler::task_type
    pub task_type: String,
    /// Positional arguments, serialized as a JSON array.
    pub args: Value,
}

/// Errors produced by the runtime layer.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The bounded submission queue is at capacity.
    #[error("queue full: {queue} (capacity {capacity})")]
    QueueFull { queue: String, capacity: usize },

    /// The worker side of the queue has shut down.
    #[error("queue closed: {queue}")]
    QueueClosed { queue: String },
}
