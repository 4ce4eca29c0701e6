mod runtime;

pub mod engine;

pub use runtime::handler::JobHandler;
pub use runtime::queue::QueueClient;
pub use runtime::storage::ResultStore;
pub use runtime::types::{Job, RuntimeError, TaskId, TaskRecord, TaskStatus};
pub use runtime::worker::WorkerPool;
