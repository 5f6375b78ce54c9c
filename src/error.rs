//! Error types for flag operations.

use thiserror::Error;

/// Result type for flag operations.
pub type FlagResult<T> = Result<T, FlagError>;

/// Flag-specific errors.
#[derive(Debug, Error)]
pub enum FlagError {
    /// Flag absent from the store
    #[error("Flag not found: {0}")]
    NotFound(String),

    /// Duplicate flag name on create
    #[error("Flag already exists: {0}")]
    Conflict(String),

    /// Rejected input, e.g. a rollout percentage outside 0-100
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transient store adapter failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}
