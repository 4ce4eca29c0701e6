use crate::state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    if let Some(origins_str) = &state.config.cors_origins {
        // Parse the comma-separated origin list and build a restrictive layer.
        // A literal `*` must go through `Any`, not the origin list.
        let origins: Vec<axum::http::HeaderValue> = origins_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "*")
            .filter_map(|s| s.parse().ok())
            .collect();
        if origins.is_empty() {
            wildcard()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_headers(Any)
                .allow_methods(Any)
        }
    } else {
        // Wildcard is fine for development; set DOCR_CORS_ORIGINS in production.
        wildcard()
    }
}

fn wildcard() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
}
