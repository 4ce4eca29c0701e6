use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::runtime::handler::JobHandler;
use crate::runtime::queue::QueueClient;
use crate::runtime::storage::ResultStore;
use crate::runtime::types::Job;

/// Spawns the worker tasks that drain a queue.
///
/// # Usage
///
/// ```rust,ignore
/// let results = ResultStore::new();
/// let queue = WorkerPool::start("ocr_queue", 100, 2, results.clone(), handler);
/// let task_id = queue.submit("process_ocr_task", json!([doc_id])).await?;
/// ```
pub struct WorkerPool;

impl WorkerPool {
    /// Start `workers` loops draining a bounded queue and return the
    /// [`QueueClient`] that feeds it.
    ///
    /// Workers share one receiver: each worker runs one task at a time, but
    /// workers run in parallel with each other.  No ordering is guaranteed
    /// across tasks once more than one worker is running.
    ///
    /// `workers` is clamped to at least 1; the pool lives until every clone
    /// of the returned client is dropped.
    pub fn start<H: JobHandler>(
        queue: &str,
        capacity: usize,
        workers: usize,
        store: ResultStore,
        handler: H,
    ) -> QueueClient {
        let (submit_tx, submit_rx) = mpsc::channel::<Job>(capacity.max(1));
        let shared_rx = Arc::new(Mutex::new(submit_rx));
        let handler = Arc::new(handler);
        let workers = workers.max(1);

        for idx in 0..workers {
            let worker_rx = Arc::clone(&shared_rx);
            let worker_store = store.clone();
            let worker_handler = Arc::clone(&handler);
            let worker_queue = queue.to_owned();
            tokio::spawn(async move {
                worker_loop(idx, worker_queue, worker_rx, worker_store, worker_handler).await;
            });
        }

        debug!(queue, workers, capacity, "worker pool started");
        QueueClient::new(queue, capacity.max(1), submit_tx, store)
    }
}

/// One worker: dequeue, execute, record, repeat until the queue closes.
async fn worker_loop<H: JobHandler>(
    worker: usize,
    queue: String,
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    store: ResultStore,
    handler: Arc<H>,
) {
    loop {
        // The receiver lock is held only while this worker waits for its
        // next job; execution happens after the guard is released.
        let job = rx.lock().await.recv().await;
        let Some(job) = job else {
            debug!(worker, queue = %queue, "queue closed; worker exiting");
            break;
        };

        let task_id = job.task_id.clone();
        if job.task_type != handler.task_type() {
            warn!(
                worker,
                task_id = %task_id,
                task_type = %job.task_type,
                "no handler registered for task type"
            );
            store
                .mark_failure(
                    &task_id,
                    format!("no handler registered for task type '{}'", job.task_type),
                )
                .await;
            continue;
        }

        store.mark_started(&task_id).await;
        info!(worker, task_id = %task_id, queue = %queue, "task started");

        // The handler runs in its own task so a panic is contained and
        // recorded instead of killing the worker loop.
        let run_handler = Arc::clone(&handler);
        let joined = tokio::spawn(async move { run_handler.run(job).await }).await;
        match joined {
            Ok(Ok(result)) => {
                info!(worker, task_id = %task_id, "task succeeded");
                store.mark_success(&task_id, result).await;
            }
            Ok(Err(err)) => {
                warn!(worker, task_id = %task_id, error = %err, "task failed");
                store.mark_failure(&task_id, format!("{err:#}")).await;
            }
            Err(join_err) => {
                let reason = abort_reason(join_err);
                error!(worker, task_id = %task_id, reason = %reason, "task handler aborted");
                store.mark_failure(&task_id, reason).await;
            }
        }
    }
}

/// Human-readable description of a handler task that never returned.
fn abort_reason(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return "task handler was cancelled".to_owned();
    }
    match err.into_panic().downcast::<String>() {
        Ok(msg) => format!("task handler panicked: {msg}"),
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => format!("task handler panicked: {msg}"),
            Err(_) => "task handler panicked".to_owned(),
        },
    }
}
