//! # codeshare-api
//!
//! HTTP API layer for CodeShare built on Axum.
//!
//! Provides the upload, resolve, detail, download, and health endpoints,
//! CORS and request logging middleware, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
