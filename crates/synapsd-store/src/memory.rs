use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::error::StoreResult;
use crate::traits::{Dataset, DatasetStats, Datastore};

/// In-memory, `BTreeMap`-based dataset.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock`
/// for safe concurrent access and cloned on read.
#[derive(Debug)]
pub struct MemoryDataset {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryDataset {
    /// Create a new empty dataset.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Snapshot the full contents (used by persistent backends).
    pub(crate) fn export(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.entries.read().expect("lock poisoned").clone()
    }

    /// Replace the full contents (used when loading a snapshot).
    pub(crate) fn import(&self, entries: BTreeMap<Vec<u8>, Vec<u8>>) {
        *self.entries.write().expect("lock poisoned") = entries;
    }
}

impl Default for MemoryDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset for MemoryDataset {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_vec(), value);
        Ok(())
    }

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.entries.read().expect("lock poisoned").contains_key(key))
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self
            .entries
            .write()
            .expect("lock poisoned")
            .remove(key)
            .is_some())
    }

    fn keys(&self) -> StoreResult<Vec<Vec<u8>>> {
        // BTreeMap iteration is already ascending byte order.
        Ok(self
            .entries
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    fn stats(&self) -> StoreResult<DatasetStats> {
        Ok(DatasetStats {
            entry_count: self.entries.read().expect("lock poisoned").len() as u64,
        })
    }
}

/// In-memory datastore: a named collection of [`MemoryDataset`]s.
pub struct InMemoryDatastore {
    datasets: RwLock<HashMap<String, Arc<MemoryDataset>>>,
}

impl InMemoryDatastore {
    /// Create a new empty datastore.
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore for InMemoryDatastore {
    fn dataset(&self, name: &str) -> StoreResult<Arc<dyn Dataset>> {
        let mut map = self.datasets.write().expect("lock poisoned");
        let ds = map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryDataset::new()));
        Ok(Arc::clone(ds) as Arc<dyn Dataset>)
    }

    fn dataset_names(&self) -> StoreResult<Vec<String>> {
        let map = self.datasets.read().expect("lock poisoned");
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn flush(&self) -> StoreResult<()> {
        // Volatile backend: nothing to persist.
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.datasets.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryDatastore")
            .field("dataset_count", &count)
            .finish()
    }
}
