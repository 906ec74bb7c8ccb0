use synapsd_types::DocumentId;

use crate::error::SynapsdResult;

/// Full-text search collaborator.
///
/// The engine forwards a document's `search_terms` on insert/update and
/// delegates free-text queries here. Tokenization and ranking are the
/// collaborator's concern; the engine only consumes the matching id set.
pub trait FullTextIndex: Send + Sync {
    /// Index the terms of a newly inserted document.
    fn insert(&self, id: DocumentId, terms: &[String]) -> SynapsdResult<()>;

    /// Replace the indexed terms of an existing document.
    fn update(&self, id: DocumentId, terms: &[String]) -> SynapsdResult<()>;

    /// Drop a document from the index.
    fn remove(&self, id: DocumentId) -> SynapsdResult<()>;

    /// Ids matching the free-text query, ascending, no duplicates.
    fn search(&self, query: &str) -> SynapsdResult<Vec<DocumentId>>;
}

/// Vector similarity collaborator.
///
/// Embeddings are opaque to the engine; they are forwarded here verbatim.
pub trait VectorStore: Send + Sync {
    /// Store (or replace) the embedding vectors for a document.
    fn upsert(&self, id: DocumentId, embeddings: &[Vec<f32>]) -> SynapsdResult<()>;

    /// Drop a document's vectors.
    fn remove(&self, id: DocumentId) -> SynapsdResult<()>;
}
