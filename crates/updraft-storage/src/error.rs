//! Storage operation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
