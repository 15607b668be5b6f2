//! Route definitions for the CodeShare HTTP API.
//!
//! JSON routes are mounted under `/api`; the download route lives at the
//! configured download path.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart framing and the small form fields.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the Axum router with all routes, threading `AppState` through.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let download_path = state.config.share.download_path.clone();

    let api_routes = Router::new()
        .merge(share_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route(&download_path, get(handlers::share::download))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Upload, resolve and detail endpoints
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::share::upload))
        .route("/share/{code}", get(handlers::share::get_share))
        .route("/share/detail/{code}", get(handlers::share::get_detail))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
