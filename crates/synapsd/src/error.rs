use thiserror::Error;

use synapsd_index::IndexError;
use synapsd_store::StoreError;
use synapsd_types::ValidationError;

/// Errors surfaced by the engine.
///
/// Validation failures happen before any write, so they never leave
/// partial state behind. Storage and index failures propagate unchanged;
/// the engine performs no retries.
#[derive(Debug, Error)]
pub enum SynapsdError {
    /// Invalid constructor configuration (e.g. no storage path and no
    /// datastore supplied).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller-input precondition violation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failure in the storage collaborator.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure in a bitmap or checksum index.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Result alias for engine operations.
pub type SynapsdResult<T> = Result<T, SynapsdError>;
