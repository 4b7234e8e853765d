//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{files, health, upload};
use crate::state::AppState;
use std::sync::Arc;

/// Slack on top of the configured per-file maximum for multipart framing and
/// the other form fields.
const BODY_LIMIT_SLACK_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size_bytes + BODY_LIMIT_SLACK_BYTES;
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/upload", post(upload::upload))
        .route("/api/files", get(files::list_files))
        .route(
            "/api/files/{key}",
            delete(files::delete_file).put(files::update_file),
        )
        .route("/api/health", get(health::health))
        .route("/api/test", get(health::test))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let list: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
