//! Service root / heartbeat endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

/// Register the heartbeat route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_health))
}

/// Heartbeat endpoint.
///
/// Returns HTTP 200 with a summary of the backing services.
/// Load-balancers and monitoring systems should poll this endpoint.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "services": {
            "database": "SQLite",
            "queue": "in-process",
            "ocr": "Tesseract",
        },
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn health_response_has_ok_status() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn health_response_lists_backing_services() {
        let Json(body) = get_health().await;
        assert_eq!(body["services"]["ocr"], "Tesseract");
        assert_eq!(body["services"]["database"], "SQLite");
    }
}
