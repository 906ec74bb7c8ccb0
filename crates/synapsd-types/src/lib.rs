//! Core types for the SynapsD document indexing engine.
//!
//! This crate defines the document record model shared by every other
//! SynapsD crate:
//!
//! - [`Document`] -- the persisted, validated unit of indexing
//! - [`DocumentInput`] -- the caller-supplied payload before validation
//! - [`DocumentId`] and the reserved identifier range
//! - checksum key encoding and digest helpers
//!
//! # Identifier space
//!
//! Ids below [`RESERVED_ID_RANGE`] belong to system-owned bit-sets and are
//! never handed out to documents. The first document id allocated on an
//! empty store is `RESERVED_ID_RANGE + 1`.

pub mod checksum;
pub mod document;
pub mod error;

// Re-export primary types at crate root for ergonomic imports.
pub use checksum::{blake3_hex, checksum_key};
pub use document::{Action, Document, DocumentInput};
pub use error::ValidationError;

/// Identifier assigned to a document. Bit-set friendly: fits a 32-bit set.
pub type DocumentId = u32;

/// Lower bound of the document id space (128 Ki). Everything below is
/// reserved for internal system bit-sets.
pub const RESERVED_ID_RANGE: DocumentId = 128 * 1024;
