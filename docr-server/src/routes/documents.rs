//! Document upload, deletion and text retrieval.

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::db::DocumentStore;
use crate::error::ServerError;
use crate::state::AppState;

/// Upper bound on a decoded upload.  The form body limit is double this
/// because base64 inflates the payload by a third.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(paths(upload_doc, delete_doc, get_text))]
pub struct DocumentsApi;

/// Register document routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload_doc", post(upload_doc))
        .route("/doc_delete/{doc_id}", delete(delete_doc))
        .route("/get_text/{doc_id}", get(get_text))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2))
}

/// Form fields accepted by [`upload_doc`].
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadDocRequest {
    /// Base64-encoded file bytes, with or without a `data:` URL prefix.
    pub file_content: String,
    /// Client-side file name; only its basename is kept.
    pub filename: String,
    /// Document date, `YYYY-MM-DD`.
    pub doc_date: String,
}

/// Store an uploaded document.
///
/// The file lands in the upload directory under a collision-free name and
/// a metadata row is created for it.  Returns `201 Created` with the new
/// document's ID.
#[utoipa::path(
    post,
    path = "/upload_doc",
    tag = "documents",
    request_body(content = UploadDocRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Document stored", body = Value),
        (status = 400, description = "Malformed base64 content or date")
    )
)]
pub async fn upload_doc(
    State(state): State<Arc<AppState>>,
    Form(req): Form<UploadDocRequest>,
) -> Result<(StatusCode, Json<Value>), ServerError> {
    // Data-URL uploads carry a `data:...;base64,` prefix; the content
    // follows the first comma.
    let encoded = match req.file_content.split_once(',') {
        Some((_prefix, rest)) => rest,
        None => req.file_content.as_str(),
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ServerError::BadRequest("Invalid base64 file content".to_owned()))?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ServerError::BadRequest(format!(
            "File too large: {} bytes",
            bytes.len()
        )));
    }

    let date: NaiveDate = req
        .doc_date
        .parse()
        .map_err(|_| ServerError::BadRequest("Invalid doc_date, expected YYYY-MM-DD".to_owned()))?;

    let saved = state.files.save_unique(&req.filename, &bytes)?;
    let doc = state.db.insert_document(&saved, date).await?;
    info!(doc_id = doc.id, path = %saved, "document uploaded");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Document uploaded successfully",
            "document_id": doc.id,
            "path": state.files.resolve(&saved).display().to_string(),
            "date": date.to_string(),
        })),
    ))
}

/// Delete a document, its stored text and its file.
///
/// The database rows go first; file removal is best-effort and reported
/// in the response rather than failing it.
#[utoipa::path(
    delete,
    path = "/doc_delete/{doc_id}",
    tag = "documents",
    params(
        ("doc_id" = i64, Path, description = "Document ID to delete")
    ),
    responses(
        (status = 200, description = "Document deleted", body = Value),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_doc(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<i64>,
) -> Result<Json<Value>, ServerError> {
    let Some(doc) = state.db.get_document(doc_id).await? else {
        return Err(ServerError::NotFound(format!(
            "Document with ID {doc_id} not found"
        )));
    };

    state.db.delete_document(doc_id).await?;

    // DB row is gone at this point; file removal is best-effort and
    // reported, not fatal.
    let file_deleted = match state.files.remove(&doc.path) {
        Ok(removed) => removed,
        Err(e) => {
            warn!(doc_id, path = %doc.path, error = %e, "failed to remove document file");
            false
        }
    };
    info!(doc_id, file_deleted, "document deleted");

    Ok(Json(json!({
        "status": "success",
        "message": "Document deleted successfully",
        "document_id": doc_id,
        "file_deleted": file_deleted,
        "path": doc.path,
    })))
}

/// Fetch the stored OCR text for a document.
#[utoipa::path(
    get,
    path = "/get_text/{doc_id}",
    tag = "documents",
    params(
        ("doc_id" = i64, Path, description = "Document ID to read text for")
    ),
    responses(
        (status = 200, description = "Stored text", body = Value),
        (status = 404, description = "Document unknown or not yet analysed")
    )
)]
pub async fn get_text(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<i64>,
) -> Result<Json<Value>, ServerError> {
    let not_found = || {
        ServerError::NotFound(format!(
            "Text for document ID {doc_id} not found. Please run analysis first."
        ))
    };
    let Some(doc) = state.db.get_document(doc_id).await? else {
        return Err(not_found());
    };
    let Some(text) = state.db.get_text(doc_id).await? else {
        return Err(not_found());
    };

    Ok(Json(json!({
        "doc_id": doc_id,
        "text": text.text,
        "path": doc.path,
        "date": doc.date.to_string(),
    })))
}
