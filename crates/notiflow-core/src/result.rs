//! Convenience result type alias for notiflow.

use crate::error::AppError;

/// A specialized `Result` type for notiflow operations.
pub type AppResult<T> = Result<T, AppError>;
