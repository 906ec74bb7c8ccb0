//! Default and in-memory collaborator implementations.
//!
//! [`NoopFullText`] and [`NoopVectors`] are the engine defaults: hosts
//! that wire no search or vector backend still get a fully working index.
//! The `InMemory*` variants back tests and small embedded deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use synapsd_types::DocumentId;

use crate::error::SynapsdResult;
use crate::traits::{FullTextIndex, VectorStore};

/// Full-text collaborator that indexes nothing and matches nothing.
#[derive(Debug, Default)]
pub struct NoopFullText;

impl FullTextIndex for NoopFullText {
    fn insert(&self, _id: DocumentId, _terms: &[String]) -> SynapsdResult<()> {
        Ok(())
    }

    fn update(&self, _id: DocumentId, _terms: &[String]) -> SynapsdResult<()> {
        Ok(())
    }

    fn remove(&self, _id: DocumentId) -> SynapsdResult<()> {
        Ok(())
    }

    fn search(&self, _query: &str) -> SynapsdResult<Vec<DocumentId>> {
        Ok(Vec::new())
    }
}

/// Vector collaborator that discards everything.
#[derive(Debug, Default)]
pub struct NoopVectors;

impl VectorStore for NoopVectors {
    fn upsert(&self, _id: DocumentId, _embeddings: &[Vec<f32>]) -> SynapsdResult<()> {
        Ok(())
    }

    fn remove(&self, _id: DocumentId) -> SynapsdResult<()> {
        Ok(())
    }
}

/// Exact-term in-memory full-text collaborator.
///
/// Matching is case-insensitive whole-term equality over whitespace-split
/// queries; anything smarter (stemming, ranking) belongs to a real search
/// backend.
#[derive(Debug, Default)]
pub struct InMemoryFullText {
    terms: RwLock<HashMap<DocumentId, Vec<String>>>,
}

impl InMemoryFullText {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FullTextIndex for InMemoryFullText {
    fn insert(&self, id: DocumentId, terms: &[String]) -> SynapsdResult<()> {
        let lowered = terms.iter().map(|t| t.to_lowercase()).collect();
        self.terms
            .write()
            .expect("fulltext lock poisoned")
            .insert(id, lowered);
        Ok(())
    }

    fn update(&self, id: DocumentId, terms: &[String]) -> SynapsdResult<()> {
        self.insert(id, terms)
    }

    fn remove(&self, id: DocumentId) -> SynapsdResult<()> {
        self.terms
            .write()
            .expect("fulltext lock poisoned")
            .remove(&id);
        Ok(())
    }

    fn search(&self, query: &str) -> SynapsdResult<Vec<DocumentId>> {
        let needles: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if needles.is_empty() {
            return Ok(Vec::new());
        }
        let map = self.terms.read().expect("fulltext lock poisoned");
        let mut ids: Vec<DocumentId> = map
            .iter()
            .filter(|(_, terms)| needles.iter().any(|n| terms.contains(n)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// In-memory vector collaborator. Stores embeddings verbatim; similarity
/// search is out of scope here.
#[derive(Debug, Default)]
pub struct InMemoryVectors {
    vectors: RwLock<HashMap<DocumentId, Vec<Vec<f32>>>>,
}

impl InMemoryVectors {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents with stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.read().expect("vector lock poisoned").len()
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VectorStore for InMemoryVectors {
    fn upsert(&self, id: DocumentId, embeddings: &[Vec<f32>]) -> SynapsdResult<()> {
        self.vectors
            .write()
            .expect("vector lock poisoned")
            .insert(id, embeddings.to_vec());
        Ok(())
    }

    fn remove(&self, id: DocumentId) -> SynapsdResult<()> {
        self.vectors
            .write()
            .expect("vector lock poisoned")
            .remove(&id);
        Ok(())
    }
}
