use thiserror::Error;

/// Errors from datastore and dataset operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file is damaged (bad magic or CRC mismatch).
    #[error("corrupt snapshot at {path}: {reason}")]
    Corruption { path: String, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
