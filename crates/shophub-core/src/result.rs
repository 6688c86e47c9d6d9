//! Convenience result type alias for ShopHub.

use crate::error::AppError;

/// A specialized `Result` type for ShopHub operations.
pub type AppResult<T> = Result<T, AppError>;
