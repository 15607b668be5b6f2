//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use codeshare_core::config::AppConfig;
use codeshare_core::traits::storage::StorageProvider;
use codeshare_database::DatabasePool;
use codeshare_service::ShareService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Byte storage holding uploaded content
    pub storage: Arc<dyn StorageProvider>,
    /// Share lifecycle
    pub share_service: Arc<ShareService>,
}
