//! Convenience result type alias for CodeShare.

use crate::error::AppError;

/// A specialized `Result` type for CodeShare operations.
pub type AppResult<T> = Result<T, AppError>;
