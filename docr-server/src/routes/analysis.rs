//! Document analysis submission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

use crate::db::DocumentStore;
use crate::error::ServerError;
use crate::handlers::ocr::OCR_TASK_TYPE;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(analyse_doc))]
pub struct AnalysisApi;

/// Register analysis routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/doc_analyse/{doc_id}", post(analyse_doc))
}

/// Queue a document for OCR.
///
/// Returns `202 Accepted` with the task handle to poll.  The existence
/// check here is advisory: the document can still vanish before the
/// worker runs, in which case the worker re-checks and reports that as a
/// domain error in the task result.
#[utoipa::path(
    post,
    path = "/doc_analyse/{doc_id}",
    tag = "analysis",
    params(
        ("doc_id" = i64, Path, description = "Document ID to analyse")
    ),
    responses(
        (status = 202, description = "Document queued for OCR", body = Value),
        (status = 404, description = "Document not found"),
        (status = 503, description = "Task queue is saturated or shut down")
    )
)]
pub async fn analyse_doc(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), ServerError> {
    if state.db.get_document(doc_id).await?.is_none() {
        return Err(ServerError::NotFound(format!(
            "Document with ID {doc_id} not found"
        )));
    }

    let task_id = state.queue.submit(OCR_TASK_TYPE, json!([doc_id])).await?;
    info!(task_id = %task_id, doc_id, "document queued for ocr");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "processing",
            "message": "Document submitted for OCR processing",
            "task_id": task_id,
            "doc_id": doc_id,
            "queue": state.queue.name(),
        })),
    ))
}
