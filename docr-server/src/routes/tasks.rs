//! Task status polling.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(task_status))]
pub struct TasksApi;

/// Register task routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/task_status/{task_id}", get(task_status))
}

/// Current status of a submitted task.
///
/// An unknown handle reads as `PENDING`: the result store cannot tell
/// "submitted but not yet started" apart from "never issued", and this
/// endpoint inherits that ambiguity.  `result` and `error` appear only
/// once they have been recorded.
#[utoipa::path(
    get,
    path = "/task_status/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "Handle returned by document analysis")
    ),
    responses(
        (status = 200, description = "Task status snapshot", body = Value)
    )
)]
pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Json<Value> {
    let record = state.results.get(&task_id).await;

    let mut body = json!({
        "task_id": record.task_id,
        "status": record.status.as_str(),
    });
    if let Some(result) = record.result {
        body["result"] = result;
    }
    if let Some(error) = record.error {
        body["error"] = json!(error);
    }
    Json(body)
}
