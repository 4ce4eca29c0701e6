//! The OCR background job: load a document's file, run text recognition,
//! persist the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use tokio::task;
use tracing::{info, warn};

use docr_core::engine::OcrEngine;
use docr_core::{Job, JobHandler};

use crate::db::DocumentStore;
use crate::files::FileStore;

/// Task type the OCR processor registers for.
pub const OCR_TASK_TYPE: &str = "process_ocr_task";

/// Domain-level outcome of one OCR job.
///
/// This is what the job's *result payload* carries; it is independent of
/// the task's transport-level status.  A task can finish `SUCCESS` while
/// its payload says `error`: the pipeline ran to completion and the
/// outcome it produced was a fault report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OcrOutcome {
    /// The pipeline could not produce text (missing document, missing
    /// file, engine or database fault).
    Error { message: String },
    /// The document already has stored text; nothing was written.
    Skipped { message: String },
    /// Text was recognized and stored.
    Success { doc_id: i64, text_length: usize },
}

/// Runs the OCR pipeline for queued documents.
pub struct OcrProcessor<S> {
    store: S,
    files: FileStore,
    engine: Arc<dyn OcrEngine>,
    languages: String,
}

impl<S: DocumentStore> OcrProcessor<S> {
    pub fn new(
        store: S,
        files: FileStore,
        engine: Arc<dyn OcrEngine>,
        languages: impl Into<String>,
    ) -> Self {
        Self {
            store,
            files,
            engine,
            languages: languages.into(),
        }
    }

    /// Run the pipeline for one document and fold every fault into the
    /// returned [`OcrOutcome`].
    pub async fn process(&self, doc_id: i64) -> OcrOutcome {
        match self.try_process(doc_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(doc_id, error = %e, "ocr pipeline fault");
                OcrOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_process(&self, doc_id: i64) -> anyhow::Result<OcrOutcome> {
        // 1. The document row can vanish between submission and pickup.
        let Some(doc) = self.store.get_document(doc_id).await? else {
            return Ok(OcrOutcome::Error {
                message: format!("Document {doc_id} not found"),
            });
        };

        // 2. Same for the file on disk.
        if !self.files.exists(&doc.path) {
            return Ok(OcrOutcome::Error {
                message: format!("File not found: {}", self.files.resolve(&doc.path).display()),
            });
        }

        // 3. Idempotency guard: a redelivered or duplicate job must not
        //    write a second text row.
        if self.store.text_exists(doc_id).await? {
            return Ok(OcrOutcome::Skipped {
                message: format!("Document {doc_id} already processed"),
            });
        }

        // 4. Recognition is CPU-bound and blocking; keep it off the
        //    async workers.
        let engine = Arc::clone(&self.engine);
        let languages = self.languages.clone();
        let path: PathBuf = self.files.resolve(&doc.path);
        let text = task::spawn_blocking(move || engine.recognize(&path, &languages)).await??;

        // 5-6. Persist and report. Length is in characters, not bytes.
        let text_length = text.chars().count();
        self.store.insert_text(doc_id, &text).await?;
        info!(doc_id, text_length, "document processed");
        Ok(OcrOutcome::Success { doc_id, text_length })
    }
}

impl<S: DocumentStore> JobHandler for OcrProcessor<S> {
    fn task_type(&self) -> &str {
        OCR_TASK_TYPE
    }

    /// Always returns `Ok`: domain faults (missing document, missing file,
    /// engine errors) are embedded in the result payload rather than
    /// failing the task, so a transport-level `FAILURE` here means the
    /// handler itself crashed.  Callers must inspect the payload's
    /// `status` tag.
    async fn run(&self, job: Job) -> anyhow::Result<Value> {
        let doc_id = parse_doc_id(&job.args)?;
        let outcome = self.process(doc_id).await;
        Ok(serde_json::to_value(outcome)?)
    }
}

/// Args arrive as a positional JSON array: `[doc_id]`.
fn parse_doc_id(args: &Value) -> anyhow::Result<i64> {
    args.get(0)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("expected [doc_id] args, got {args}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use serde_json::json;

    use crate::db::{Document, DocumentText};
    use docr_core::engine::OcrError;
    use docr_core::TaskId;

    use super::*;

    #[derive(Default)]
    struct MemInner {
        docs: HashMap<i64, Document>,
        texts: Vec<DocumentText>,
        next_doc_id: i64,
        next_text_id: i64,
        fail_inserts: bool,
    }

    /// In-memory [`DocumentStore`] for handler tests.
    #[derive(Clone, Default)]
    struct MemStore {
        inner: Arc<Mutex<MemInner>>,
    }

    impl MemStore {
        fn fail_inserts(&self) {
            self.inner.lock().unwrap().fail_inserts = true;
        }

        fn text_rows(&self) -> usize {
            self.inner.lock().unwrap().texts.len()
        }
    }

    impl DocumentStore for MemStore {
        async fn insert_document(
            &self,
            path: &str,
            date: NaiveDate,
        ) -> Result<Document, sqlx::Error> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_doc_id += 1;
            let doc = Document {
                id: inner.next_doc_id,
                path: path.to_owned(),
                date,
            };
            inner.docs.insert(doc.id, doc.clone());
            Ok(doc)
        }

        async fn get_document(&self, id: i64) -> Result<Option<Document>, sqlx::Error> {
            Ok(self.inner.lock().unwrap().docs.get(&id).cloned())
        }

        async fn delete_document(&self, id: i64) -> Result<bool, sqlx::Error> {
            let mut inner = self.inner.lock().unwrap();
            inner.texts.retain(|t| t.doc_id != id);
            Ok(inner.docs.remove(&id).is_some())
        }

        async fn text_exists(&self, doc_id: i64) -> Result<bool, sqlx::Error> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .texts
                .iter()
                .any(|t| t.doc_id == doc_id))
        }

        async fn insert_text(&self, doc_id: i64, text: &str) -> Result<(), sqlx::Error> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_inserts {
                return Err(sqlx::Error::PoolClosed);
            }
            inner.next_text_id += 1;
            let row = DocumentText {
                id: inner.next_text_id,
                doc_id,
                text: text.to_owned(),
            };
            inner.texts.push(row);
            Ok(())
        }

        async fn get_text(&self, doc_id: i64) -> Result<Option<DocumentText>, sqlx::Error> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .texts
                .iter()
                .find(|t| t.doc_id == doc_id)
                .cloned())
        }
    }

    /// Engine returning fixed text, or an error when `text` is `None`.
    struct FakeEngine {
        text: Option<String>,
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, _path: &std::path::Path, _languages: &str) -> Result<String, OcrError> {
            match &self.text {
                Some(text) => Ok(text.clone()),
                None => Err(OcrError::new("simulated engine crash")),
            }
        }
    }

    fn test_files() -> FileStore {
        let root = std::env::temp_dir().join(format!("docr_ocr_{}", uuid::Uuid::new_v4()));
        FileStore::new(root).unwrap()
    }

    fn processor(store: MemStore, files: FileStore, text: Option<&str>) -> OcrProcessor<MemStore> {
        let engine = Arc::new(FakeEngine {
            text: text.map(str::to_owned),
        });
        OcrProcessor::new(store, files, engine, "eng")
    }

    async fn stored_document(store: &MemStore, files: &FileStore) -> Document {
        let saved = files.save_unique("scan.png", b"pixels").unwrap();
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        store.insert_document(&saved, date).await.unwrap()
    }

    fn job_for(doc_id: i64) -> Job {
        Job {
            task_id: TaskId::from("test-task"),
            task_type: OCR_TASK_TYPE.to_owned(),
            args: json!([doc_id]),
        }
    }

    #[tokio::test]
    async fn missing_document_yields_an_error_outcome() {
        let store = MemStore::default();
        let processor = processor(store.clone(), test_files(), Some("text"));
        match processor.process(42).await {
            OcrOutcome::Error { message } => assert_eq!(message, "Document 42 not found"),
            other => panic!("expected error outcome, got {other:?}"),
        }
        assert_eq!(store.text_rows(), 0);
    }

    #[tokio::test]
    async fn missing_file_yields_an_error_outcome() {
        let store = MemStore::default();
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        let doc = store.insert_document("gone.png", date).await.unwrap();

        let processor = processor(store, test_files(), Some("text"));
        match processor.process(doc.id).await {
            OcrOutcome::Error { message } => {
                assert!(message.starts_with("File not found:"), "got: {message}");
            }
            other => panic!("expected error outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_run_is_skipped_by_the_idempotency_guard() {
        let store = MemStore::default();
        let files = test_files();
        let doc = stored_document(&store, &files).await;
        let processor = processor(store.clone(), files, Some("recognized"));

        match processor.process(doc.id).await {
            OcrOutcome::Success { doc_id, text_length } => {
                assert_eq!(doc_id, doc.id);
                assert_eq!(text_length, "recognized".len());
            }
            other => panic!("expected success outcome, got {other:?}"),
        }
        match processor.process(doc.id).await {
            OcrOutcome::Skipped { message } => {
                assert_eq!(message, format!("Document {} already processed", doc.id));
            }
            other => panic!("expected skipped outcome, got {other:?}"),
        }
        assert_eq!(store.text_rows(), 1);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn engine_fault_is_embedded_not_raised() {
        let store = MemStore::default();
        let files = test_files();
        let doc = stored_document(&store, &files).await;
        let processor = processor(store, files, None);

        // run() stays Ok even though the engine failed.
        let value = processor.run(job_for(doc.id)).await.unwrap();
        assert_eq!(value["status"], "error");
        let message = value["message"].as_str().unwrap();
        assert!(
            message.contains("OCR processing failed: simulated engine crash"),
            "got: {message}"
        );
        assert!(logs_contain("ocr pipeline fault"));
    }

    #[tokio::test]
    async fn text_length_counts_characters_not_bytes() {
        let store = MemStore::default();
        let files = test_files();
        let doc = stored_document(&store, &files).await;
        let processor = processor(store, files, Some("привет"));

        match processor.process(doc.id).await {
            OcrOutcome::Success { text_length, .. } => assert_eq!(text_length, 6),
            other => panic!("expected success outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn persistence_fault_is_embedded_not_raised() {
        let store = MemStore::default();
        let files = test_files();
        let doc = stored_document(&store, &files).await;
        store.fail_inserts();
        let processor = processor(store, files, Some("text"));

        let value = processor.run(job_for(doc.id)).await.unwrap();
        assert_eq!(value["status"], "error");
    }

    #[tokio::test]
    async fn malformed_args_do_fail_the_task() {
        let processor = processor(MemStore::default(), test_files(), Some("text"));
        let job = Job {
            task_id: TaskId::from("test-task"),
            task_type: OCR_TASK_TYPE.to_owned(),
            args: json!({"doc_id": 1}),
        };
        let err = processor.run(job).await.unwrap_err();
        assert!(err.to_string().contains("expected [doc_id] args"));
    }
}
