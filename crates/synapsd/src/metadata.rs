use std::sync::Arc;

use synapsd_store::{decode_record, encode_record, Dataset, StoreResult};
use synapsd_types::{Document, DocumentId};

/// Dataset wrapper holding one record per document, keyed by id.
///
/// Keys are big-endian id bytes so the dataset's byte order is ascending
/// id order and scans come back sorted for free.
pub struct MetadataStore {
    dataset: Arc<dyn Dataset>,
}

impl MetadataStore {
    /// Wrap the given dataset.
    pub fn new(dataset: Arc<dyn Dataset>) -> Self {
        Self { dataset }
    }

    fn key(id: DocumentId) -> [u8; 4] {
        id.to_be_bytes()
    }

    /// Read the record for `id`. `Ok(None)` when absent.
    pub fn get(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        match self.dataset.get(&Self::key(id))? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Upsert the record under its own id.
    pub fn put(&self, document: &Document) -> StoreResult<()> {
        let bytes = encode_record(document)?;
        self.dataset.put(&Self::key(document.id), bytes)
    }

    /// Check whether a record exists for `id`.
    pub fn has(&self, id: DocumentId) -> StoreResult<bool> {
        self.dataset.has(&Self::key(id))
    }

    /// Delete the record. Returns `true` if one existed.
    pub fn delete(&self, id: DocumentId) -> StoreResult<bool> {
        self.dataset.delete(&Self::key(id))
    }

    /// All stored ids, ascending.
    pub fn ids(&self) -> StoreResult<Vec<DocumentId>> {
        let keys = self.dataset.keys()?;
        Ok(keys
            .into_iter()
            .filter_map(|k| <[u8; 4]>::try_from(k.as_slice()).ok())
            .map(DocumentId::from_be_bytes)
            .collect())
    }

    /// Live record count.
    pub fn count(&self) -> StoreResult<u64> {
        Ok(self.dataset.stats()?.entry_count)
    }
}
