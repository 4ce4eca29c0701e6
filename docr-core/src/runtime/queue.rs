use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::runtime::storage::ResultStore;
use crate::runtime::types::{Job, RuntimeError, TaskId};

/// Submission side of a named task queue.
///
/// Obtained from [`WorkerPool::start`]; cheap to clone and share across
/// request handlers.
///
/// [`WorkerPool::start`]: crate::runtime::worker::WorkerPool::start
#[derive(Debug, Clone)]
pub struct QueueClient {
    queue: Arc<str>,
    capacity: usize,
    submit_tx: mpsc::Sender<Job>,
    store: ResultStore,
}

impl QueueClient {
    pub(crate) fn new(
        queue: &str,
        capacity: usize,
        submit_tx: mpsc::Sender<Job>,
        store: ResultStore,
    ) -> Self {
        Self {
            queue: Arc::from(queue),
            capacity,
            submit_tx,
            store,
        }
    }

    /// Name of the queue this client feeds.
    pub fn name(&self) -> &str {
        &self.queue
    }

    /// Enqueue a task and return its freshly issued handle.
    ///
    /// Never waits for execution.  A `PENDING` record is visible to pollers
    /// as soon as this returns.  Rejections are synchronous:
    /// [`RuntimeError::QueueFull`] when the bounded queue is at capacity,
    /// [`RuntimeError::QueueClosed`] when the workers are gone; a rejected
    /// submission leaves no record behind.
    pub async fn submit(&self, task_type: &str, args: Value) -> Result<TaskId, RuntimeError> {
        let task_id: TaskId = Uuid::new_v4().to_string();
        self.store.insert_pending(&task_id).await;

        let job = Job {
            task_id: task_id.clone(),
            task_type: task_type.to_owned(),
            args,
        };
        if let Err(err) = self.submit_tx.try_send(job) {
            self.store.remove(&task_id).await;
            return Err(match err {
                mpsc::error::TrySendError::Full(_) => RuntimeError::QueueFull {
                    queue: self.queue.to_string(),
                    capacity: self.capacity,
                },
                mpsc::error::TrySendError::Closed(_) => RuntimeError::QueueClosed {
                    queue: self.queue.to_string(),
                },
            });
        }

        debug!(task_id = %task_id, queue = %self.queue, task_type, "task enqueued");
        Ok(task_id)
    }
}
