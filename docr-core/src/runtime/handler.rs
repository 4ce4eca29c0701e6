use serde_json::Value;

use crate::runtime::types::Job;

/// A unit of work executed by the worker pool.
///
/// `run` uses `impl Future` in its signature (stable since Rust 1.75) so no
/// extra `async-trait` crate is required; implementations can simply write
/// `async fn run`.
///
/// The return value maps onto transport-level task status: `Ok(value)`
/// records `SUCCESS` with `value` as the result payload, `Err` records
/// `FAILURE` with the error's description.  Handlers that need to report
/// domain failures without failing the task embed them in the `Ok` payload.
pub trait JobHandler: Send + Sync + 'static {
    /// Task-type string submissions are matched against.
    fn task_type(&self) -> &str;

    /// Execute one job to completion.
    fn run(&self, job: Job) -> impl std::future::Future<Output = anyhow::Result<Value>> + Send;
}
