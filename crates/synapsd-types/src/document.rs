use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::DocumentId;

/// What a write intends to do with a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A new document (the default).
    #[default]
    Insert,
    /// Full in-place replacement of an existing document.
    Update,
    /// Logical removal.
    Delete,
}

/// Caller-supplied document payload, before validation and id assignment.
///
/// `checksums` maps algorithm names to digests and must be non-empty.
/// `embeddings` must be a non-empty sequence of vectors; the engine treats
/// them as opaque and forwards them to the vector collaborator.
/// `search_terms` may be empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Existing id, if the caller is updating a known document.
    pub id: Option<DocumentId>,
    /// Algorithm name -> digest. At least one entry required.
    pub checksums: BTreeMap<String, String>,
    /// Embedding vectors, opaque to the core.
    pub embeddings: Vec<Vec<f32>>,
    /// Tokens forwarded to the full-text collaborator.
    pub search_terms: Vec<String>,
    /// Write intent; defaults to [`Action::Insert`].
    #[serde(default)]
    pub action: Action,
}

impl DocumentInput {
    /// Check the input against the persistence preconditions.
    ///
    /// A document is never persisted without passing this: non-empty
    /// checksums with non-empty algorithm/digest strings, and a non-empty
    /// embedding sequence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.checksums.is_empty() {
            return Err(ValidationError::EmptyChecksums);
        }
        for (algorithm, digest) in &self.checksums {
            if algorithm.is_empty() {
                return Err(ValidationError::EmptyAlgorithm);
            }
            if digest.is_empty() {
                return Err(ValidationError::EmptyDigest);
            }
        }
        if self.embeddings.is_empty() {
            return Err(ValidationError::EmptyEmbeddings);
        }
        Ok(())
    }

    /// Build the persisted record, stamping timestamps.
    ///
    /// `created_at` falls back to `now` when no prior record exists.
    pub fn into_document(
        self,
        id: DocumentId,
        action: Action,
        created_at: Option<DateTime<Utc>>,
    ) -> Document {
        let now = Utc::now();
        Document {
            id,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
            action,
            checksums: self.checksums,
            embeddings: self.embeddings,
            search_terms: self.search_terms,
        }
    }
}

/// The persisted unit of indexing.
///
/// Immutable id, ISO-8601 timestamps set on write, and the validated
/// payload carried over from [`DocumentInput`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, immutable once assigned.
    pub id: DocumentId,
    /// Set on first persistence, preserved across updates.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write.
    pub updated_at: DateTime<Utc>,
    /// The write intent that produced this record.
    pub action: Action,
    /// Algorithm name -> digest.
    pub checksums: BTreeMap<String, String>,
    /// Embedding vectors, opaque to the core.
    pub embeddings: Vec<Vec<f32>>,
    /// Tokens forwarded to the full-text collaborator.
    pub search_terms: Vec<String>,
}
