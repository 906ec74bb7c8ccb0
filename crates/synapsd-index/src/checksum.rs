use std::sync::Arc;

use tracing::debug;

use synapsd_store::Dataset;
use synapsd_types::{checksum_key, DocumentId};

use crate::error::{IndexError, IndexResult};

/// Inverted `"<algorithm>/<digest>" -> document id` mapping.
///
/// Single current mapping only: `put` overwrites any prior id for the same
/// pair (last write wins). No merge or multi-id semantics.
pub struct ChecksumIndex {
    dataset: Arc<dyn Dataset>,
}

impl ChecksumIndex {
    /// Create an index over `dataset`.
    pub fn new(dataset: Arc<dyn Dataset>) -> Self {
        Self { dataset }
    }

    /// Upsert the mapping for `(algorithm, digest)`.
    pub fn put(&self, algorithm: &str, digest: &str, id: DocumentId) -> IndexResult<()> {
        let key = checksum_key(algorithm, digest);
        self.dataset.put(key.as_bytes(), id.to_le_bytes().to_vec())?;
        debug!(key = %key, id, "checksum entry written");
        Ok(())
    }

    /// Exact lookup. `Ok(None)` when the pair was never indexed.
    pub fn resolve(&self, algorithm: &str, digest: &str) -> IndexResult<Option<DocumentId>> {
        let key = checksum_key(algorithm, digest);
        let Some(bytes) = self.dataset.get(key.as_bytes())? else {
            return Ok(None);
        };
        let arr: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IndexError::MalformedEntry { key })?;
        Ok(Some(DocumentId::from_le_bytes(arr)))
    }

    /// Drop the mapping. Returns `true` if an entry existed.
    pub fn remove(&self, algorithm: &str, digest: &str) -> IndexResult<bool> {
        let key = checksum_key(algorithm, digest);
        Ok(self.dataset.delete(key.as_bytes())?)
    }
}
