//! CodeShare Server: share files and text behind short access codes.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use codeshare_api::AppState;
use codeshare_core::config::AppConfig;
use codeshare_core::error::AppError;
use codeshare_database::{DatabasePool, SqliteShareRepository};
use codeshare_service::{ExpiryPolicy, ShareService, SystemClock};
use codeshare_storage::{ContentStore, LocalStorageProvider};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `CODESHARE_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("CODESHARE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CodeShare v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    codeshare_database::migration::run_migrations(db.pool()).await?;

    // ── Step 3: Storage ──────────────────────────────────────────
    let provider = Arc::new(LocalStorageProvider::new(&config.storage.root));
    let content = Arc::new(ContentStore::new(provider.clone(), &config.storage.root));

    // ── Step 4: Repositories and services ────────────────────────
    let share_repo = Arc::new(SqliteShareRepository::new(db.pool().clone()));
    let share_service = Arc::new(ShareService::new(
        share_repo,
        content,
        ExpiryPolicy::new(Arc::new(SystemClock)),
        config.storage.max_upload_size_bytes,
        config.share.code_generation_attempts,
    ));

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app_state = AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        storage: provider,
        share_service,
    };

    let app = codeshare_api::build_app(app_state, &config.server.cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "CodeShare server listening");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, draining connections...");
                let _ = shutdown_tx.send(true);
            })
            .await
    });

    let served = tokio::select! {
        result = &mut server => Some(result),
        _ = shutdown_rx.changed() => None,
    };

    let result = match served {
        Some(result) => Some(result),
        None => {
            let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => Some(result),
                Err(_) => {
                    tracing::warn!(
                        grace_seconds = config.server.shutdown_grace_seconds,
                        "Grace period elapsed, closing remaining connections"
                    );
                    server.abort();
                    None
                }
            }
        }
    };

    if let Some(result) = result {
        result
            .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;
    }

    db.close().await;
    tracing::info!("CodeShare server shut down gracefully");
    Ok(())
}

/// Create the content root and the upload spool directory.
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let dirs = [
        std::path::PathBuf::from(&config.storage.root),
        config.storage.spool_path(),
    ];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::configuration(format!(
                "Failed to create dir '{}': {e}",
                dir.display()
            ))
        })?;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
