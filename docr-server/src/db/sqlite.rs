//! SQLite implementation of [`DocumentStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  Migrations are run
//! automatically on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary.  The database file location is determined at
//! runtime by `DOCR_DATABASE_URL` and is **not** related to the working
//! directory at runtime.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use super::{Document, DocumentStore, DocumentText};

/// SQLite-backed document store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL; use `?mode=rwc` so a
    /// missing database file is created instead of failing, e.g.
    /// `"sqlite://docr.db?mode=rwc"`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(url).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl DocumentStore for SqliteStore {
    async fn insert_document(&self, path: &str, date: NaiveDate) -> Result<Document, sqlx::Error> {
        let date_str = date.to_string();
        let result = sqlx::query("INSERT INTO documents (path, date) VALUES (?1, ?2)")
            .bind(path)
            .bind(&date_str)
            .execute(&self.pool)
            .await?;
        Ok(Document {
            id: result.last_insert_rowid(),
            path: path.to_owned(),
            date,
        })
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>, sqlx::Error> {
        let row: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, path, date FROM documents WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, path, date)| Document {
            id,
            path,
            date: date.parse().unwrap_or_else(|e: chrono::ParseError| {
                tracing::warn!(raw = %date, error = %e, "failed to parse document date; using today");
                Utc::now().date_naive()
            }),
        }))
    }

    async fn delete_document(&self, id: i64) -> Result<bool, sqlx::Error> {
        // Text rows go first; SQLite only enforces the FK cascade when
        // `PRAGMA foreign_keys` is on, which we do not rely upon.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM documents_text WHERE doc_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn text_exists(&self, doc_id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM documents_text WHERE doc_id = ?1 LIMIT 1")
                .bind(doc_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert_text(&self, doc_id: i64, text: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO documents_text (doc_id, text) VALUES (?1, ?2)")
            .bind(doc_id)
            .bind(text)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_text(&self, doc_id: i64) -> Result<Option<DocumentText>, sqlx::Error> {
        let row: Option<(i64, i64, String)> = sqlx::query_as(
            "SELECT id, doc_id, text FROM documents_text WHERE doc_id = ?1 ORDER BY id LIMIT 1",
        )
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, doc_id, text)| DocumentText { id, doc_id, text }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    /// Fresh store over a temp-file database.  A pooled `sqlite::memory:`
    /// URL would hand each pooled connection its own empty database, so
    /// file-backed it is.
    async fn test_store() -> SqliteStore {
        let path = std::env::temp_dir().join(format!("docr_db_{}.sqlite", uuid::Uuid::new_v4()));
        SqliteStore::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .expect("test database should open")
    }

    #[tokio::test]
    async fn insert_and_fetch_document_round_trip() {
        let store = test_store().await;
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        let doc = store.insert_document("scan.png", date).await.unwrap();
        assert!(doc.id > 0);

        let fetched = store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.path, "scan.png");
        assert_eq!(fetched.date, date);
    }

    #[tokio::test]
    async fn unknown_document_reads_as_none() {
        let store = test_store().await;
        assert!(store.get_document(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn text_exists_flips_after_insert() {
        let store = test_store().await;
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        let doc = store.insert_document("scan.png", date).await.unwrap();

        assert!(!store.text_exists(doc.id).await.unwrap());
        store.insert_text(doc.id, "hello").await.unwrap();
        assert!(store.text_exists(doc.id).await.unwrap());

        let text = store.get_text(doc.id).await.unwrap().unwrap();
        assert_eq!(text.text, "hello");
        assert_eq!(text.doc_id, doc.id);
    }

    #[tokio::test]
    async fn delete_removes_document_and_text() {
        let store = test_store().await;
        let date: NaiveDate = "2024-03-15".parse().unwrap();
        let doc = store.insert_document("scan.png", date).await.unwrap();
        store.insert_text(doc.id, "hello").await.unwrap();

        assert!(store.delete_document(doc.id).await.unwrap());
        assert!(store.get_document(doc.id).await.unwrap().is_none());
        assert!(!store.text_exists(doc.id).await.unwrap());
        // Second delete is a no-op.
        assert!(!store.delete_document(doc.id).await.unwrap());
    }
}
