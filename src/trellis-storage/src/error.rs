//! Error types for trellis-storage.

use thiserror::Error;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Home directory not found.
    #[error("Could not determine home directory")]
    HomeDirNotFound,
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
