use thiserror::Error;

/// Caller-input and precondition violations.
///
/// Validation always fails fast, before any write occurs, so a rejected
/// input never leaves partial state behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The document carries no checksum entries.
    #[error("document has no checksums; at least one (algorithm, digest) pair is required")]
    EmptyChecksums,

    /// The document carries no embedding vectors.
    #[error("document has no embeddings; a non-empty sequence of vectors is required")]
    EmptyEmbeddings,

    /// An operation required an id the caller did not supply.
    #[error("document id is required for this operation")]
    MissingId,

    /// Zero is not a valid document id.
    #[error("document id must be a positive integer")]
    InvalidId,

    /// A caller-supplied id fell inside the reserved internal range.
    #[error("document id {0} is inside the reserved internal range")]
    ReservedId(crate::DocumentId),

    /// A checksum algorithm name was empty.
    #[error("checksum algorithm must be a non-empty string")]
    EmptyAlgorithm,

    /// A checksum digest was empty.
    #[error("checksum digest must be a non-empty string")]
    EmptyDigest,
}
