pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // CV uploads are bounded by MAX_UPLOAD_BYTES; leave headroom for the
    // other multipart fields.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + 64 * 1024);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/cv-boost/analyze_job", post(handlers::handle_analyze_job))
        .route(
            "/cv-boost/generate_cv/strict",
            post(handlers::handle_generate_cv),
        )
        .layer(body_limit)
        .with_state(state)
}
