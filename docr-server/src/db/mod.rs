//! Database abstraction layer.
//!
//! [`DocumentStore`] defines the persistence interface the OCR job handler
//! and the HTTP routes run against.  The default implementation is
//! [`sqlite::SqliteStore`]; tests substitute an in-memory fake.  To swap to
//! another database (Postgres, MySQL), implement [`DocumentStore`] for the
//! new type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since
//! Rust 1.75) so no extra `async-trait` crate is required.

pub mod sqlite;

use chrono::NaiveDate;

/// A single row in the `documents` table.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i64,
    /// Storage path relative to the upload directory.
    pub path: String,
    /// Business date supplied at upload time.
    pub date: NaiveDate,
}

/// A single row in the `documents_text` table.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub id: i64,
    pub doc_id: i64,
    /// Full extracted text; can legitimately be empty.
    pub text: String,
}

/// Trait for persisting documents and their extracted text.
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a document row and return it with its assigned id.
    fn insert_document(
        &self,
        path: &str,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Document, sqlx::Error>> + Send;

    /// Fetch a document by id.
    fn get_document(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Document>, sqlx::Error>> + Send;

    /// Delete a document and its text rows in one transaction.
    ///
    /// Returns `false` when no document row existed.
    fn delete_document(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Whether extracted text already exists for `doc_id`.
    ///
    /// This is the OCR handler's idempotency guard, so it must see rows
    /// written by other connections as soon as they commit.
    fn text_exists(
        &self,
        doc_id: i64,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Insert a new text row for `doc_id`.
    fn insert_text(
        &self,
        doc_id: i64,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;

    /// Fetch the text row for `doc_id`, oldest first when several exist.
    fn get_text(
        &self,
        doc_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<DocumentText>, sqlx::Error>> + Send;
}
