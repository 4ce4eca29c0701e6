//! Shared application state injected into every Axum handler.
//!
//! Everything a request handler touches is reachable through this struct;
//! nothing lives in globals.  The worker pool received its own clones of
//! the store handles at startup, so dropping `AppState` does not stop the
//! workers.

use std::sync::Arc;

use docr_core::{QueueClient, ResultStore};

use crate::config::Config;
use crate::db::sqlite::SqliteStore;
use crate::files::FileStore;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Resolved startup configuration.
    pub config: Arc<Config>,
    /// Document metadata and text storage.
    pub db: Arc<SqliteStore>,
    /// Uploaded file storage.
    pub files: Arc<FileStore>,
    /// Submission side of the OCR queue.
    pub queue: QueueClient,
    /// Read side of the task result store.
    pub results: ResultStore,
}
