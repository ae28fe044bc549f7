//! Error types for the busy-block sync engine.

use thiserror::Error;

/// Errors that can occur during synchronization.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar permission denied: {0}")]
    Permission(String),

    #[error("Calendar provider error: {0}")]
    Provider(String),

    #[error("Mapping store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A sync run is already in progress for this mirror calendar")]
    SyncInProgress,
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
