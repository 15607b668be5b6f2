//! Share record store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use codeshare_core::error::{AppError, ErrorKind};
use codeshare_core::result::AppResult;
use codeshare_entity::share::{CreateShare, Share, ShareStatus};

/// Persistence contract for share records.
///
/// "Not found" is `Ok(None)`; errors are reserved for store failures.
#[async_trait]
pub trait ShareRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new share. A duplicate id or locator yields `ErrorKind::Conflict`.
    async fn create(&self, data: &CreateShare) -> AppResult<Share>;

    /// Find the share for a code. With duplicate codes the oldest record wins.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Share>>;

    /// Find a share by id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Share>>;

    /// Set the access status. Returns `true` if a row was updated.
    async fn update_status(&self, id: &str, status: ShareStatus) -> AppResult<bool>;
}

/// SQLite-backed share repository.
#[derive(Debug, Clone)]
pub struct SqliteShareRepository {
    pool: SqlitePool,
}

impl SqliteShareRepository {
    /// Create a new share repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for SqliteShareRepository {
    async fn create(&self, data: &CreateShare) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            "INSERT INTO shares (id, locator, text, expire_quantity, expire_unit, status, code, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING *",
        )
        .bind(&data.id)
        .bind(&data.locator)
        .bind(&data.text)
        .bind(data.expire_quantity)
        .bind(data.expire_unit)
        .bind(ShareStatus::Unused)
        .bind(&data.code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if unique {
                AppError::with_source(ErrorKind::Conflict, "Share already exists", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create share", e)
            }
        })
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE code = ?1 ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share by code", e))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find share", e))
    }

    async fn update_status(&self, id: &str, status: ShareStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE shares SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update share status", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
