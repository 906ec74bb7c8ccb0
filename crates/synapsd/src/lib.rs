//! SynapsD -- an embedded document indexing engine.
//!
//! SynapsD stores structured documents, assigns them stable identifiers,
//! deduplicates by content checksum, and answers set-membership queries
//! over two orthogonal label spaces: *contexts* (all must match, AND) and
//! *features* (any may match, OR). It is a library boundary, not a network
//! service.
//!
//! # Quick start
//!
//! ```
//! use std::collections::BTreeMap;
//! use synapsd::{DocumentInput, QueryOptions, SynapsD, SynapsdOptions};
//!
//! let engine = SynapsD::open(SynapsdOptions::in_memory()).unwrap();
//!
//! let mut checksums = BTreeMap::new();
//! checksums.insert("sha256".to_string(), "d1".to_string());
//! let input = DocumentInput {
//!     checksums,
//!     embeddings: vec![vec![0.1]],
//!     ..Default::default()
//! };
//!
//! let id = engine
//!     .insert_document(input, &["work".into()], &["tag/todo".into()])
//!     .unwrap();
//! assert!(engine
//!     .has_document(id, &["work".into()], &["tag/todo".into()])
//!     .unwrap());
//! ```
//!
//! # Components
//!
//! - [`SynapsD`] -- the orchestrator: validation, persistence, indexing,
//!   queries, notifications
//! - [`IdAllocator`] -- persisted monotonic id sequence above the reserved
//!   range
//! - [`FullTextIndex`] / [`VectorStore`] -- collaborator seams for search
//!   and embeddings
//! - [`EngineEvent`] -- in-process notifications with broadcast fan-out

pub mod allocator;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod memory;
pub mod metadata;
pub mod query;
pub mod traits;

pub use allocator::IdAllocator;
pub use config::SynapsdOptions;
pub use engine::SynapsD;
pub use error::{SynapsdError, SynapsdResult};
pub use events::EngineEvent;
pub use memory::{InMemoryFullText, InMemoryVectors, NoopFullText, NoopVectors};
pub use metadata::MetadataStore;
pub use query::{QueryFilters, QueryOptions, QueryResult};
pub use traits::{FullTextIndex, VectorStore};

// Re-export the shared vocabulary so embedders need a single import.
pub use synapsd_index::{BitmapCache, ChecksumIndex, LabelIndex};
pub use synapsd_store::{Datastore, FileDatastore, InMemoryDatastore, StoreOptions};
pub use synapsd_types::{
    blake3_hex, checksum_key, Action, Document, DocumentId, DocumentInput, ValidationError,
    RESERVED_ID_RANGE,
};
