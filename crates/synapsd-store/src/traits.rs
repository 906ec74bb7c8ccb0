use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Live entry statistics for a dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Number of entries currently stored.
    pub entry_count: u64,
}

/// One named, ordered, byte-keyed map inside a datastore.
///
/// All implementations must satisfy these invariants:
/// - A `put` is visible to every subsequent `get`/`has`/`keys` call.
/// - `keys()` returns keys in ascending byte order, without duplicates.
/// - The dataset never interprets values; serialization is the caller's
///   concern (see [`encode_record`]/[`decode_record`]).
/// - All I/O errors are propagated, never silently ignored.
pub trait Dataset: Send + Sync {
    /// Read the value stored under `key`. `Ok(None)` if absent.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Upsert `value` under `key`.
    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    /// Check whether `key` is present.
    fn has(&self, key: &[u8]) -> StoreResult<bool>;

    /// Delete `key`. Returns `true` if an entry existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// All keys, ascending byte order.
    fn keys(&self) -> StoreResult<Vec<Vec<u8>>>;

    /// Live entry statistics.
    fn stats(&self) -> StoreResult<DatasetStats>;
}

/// A collection of named datasets with a shared lifecycle.
pub trait Datastore: Send + Sync {
    /// Obtain the dataset named `name`, creating it on first use.
    fn dataset(&self, name: &str) -> StoreResult<std::sync::Arc<dyn Dataset>>;

    /// Names of all datasets created so far, ascending.
    fn dataset_names(&self) -> StoreResult<Vec<String>>;

    /// Make all in-memory state durable (no-op for purely volatile backends).
    fn flush(&self) -> StoreResult<()>;

    /// Flush and release the backend. Operations after close are undefined;
    /// callers must not invoke them.
    fn close(&self) -> StoreResult<()>;
}

/// Encode a structured record for storage (bincode).
pub fn encode_record<T: Serialize>(record: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a structured record read from storage (bincode).
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
