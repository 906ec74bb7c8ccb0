use synapsd_store::StoreError;
use synapsd_types::DocumentId;
use thiserror::Error;

/// Errors from bitmap and checksum index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The id falls inside the internal reserved range.
    #[error("id {id} is below the index range floor {range_min}")]
    IdBelowRange {
        id: DocumentId,
        range_min: DocumentId,
    },

    /// A context or feature label was empty.
    #[error("label must be a non-empty string")]
    EmptyLabel,

    /// A persisted bit-set could not be encoded or decoded.
    #[error("bitmap serialization failed for label {label}: {reason}")]
    Bitmap { label: String, reason: String },

    /// A checksum index entry holds something other than a document id.
    #[error("malformed checksum entry under key {key}")]
    MalformedEntry { key: String },

    /// Failure in the backing dataset.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
