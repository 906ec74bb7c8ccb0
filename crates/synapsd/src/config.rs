use std::path::PathBuf;
use std::sync::Arc;

use synapsd_index::BitmapCache;
use synapsd_store::Datastore;

use crate::traits::{FullTextIndex, VectorStore};

/// Constructor options for [`crate::SynapsD`].
///
/// A storage `path` is required unless an existing `datastore` is
/// supplied. The backup and compression flags are delegated to the file
/// backend and ignored for injected datastores.
#[derive(Clone, Default)]
pub struct SynapsdOptions {
    /// Root directory of the file-backed datastore.
    pub path: Option<PathBuf>,
    /// Existing storage instance; overrides `path`.
    pub datastore: Option<Arc<dyn Datastore>>,
    /// Copy the snapshot aside before loading it.
    pub backup_on_open: bool,
    /// Copy the snapshot aside before the closing write.
    pub backup_on_close: bool,
    /// Compress snapshot payloads.
    pub compression: bool,
    /// Externally supplied bitmap cache; a fresh one is created otherwise.
    pub cache: Option<BitmapCache>,
    /// Per-subscriber event channel capacity (0 means the default, 1024).
    pub channel_capacity: usize,
    /// Full-text collaborator; defaults to [`crate::NoopFullText`].
    pub fulltext: Option<Arc<dyn FullTextIndex>>,
    /// Vector collaborator; defaults to [`crate::NoopVectors`].
    pub vectors: Option<Arc<dyn VectorStore>>,
}

impl SynapsdOptions {
    /// Options for a file-backed engine rooted at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Options for a purely in-memory engine (tests and embedding).
    pub fn in_memory() -> Self {
        Self {
            datastore: Some(Arc::new(synapsd_store::InMemoryDatastore::new())),
            ..Default::default()
        }
    }

    /// Use an existing storage instance.
    pub fn with_datastore(mut self, datastore: Arc<dyn Datastore>) -> Self {
        self.datastore = Some(datastore);
        self
    }

    /// Use an externally shared bitmap cache.
    pub fn with_cache(mut self, cache: BitmapCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Wire a full-text collaborator.
    pub fn with_fulltext(mut self, fulltext: Arc<dyn FullTextIndex>) -> Self {
        self.fulltext = Some(fulltext);
        self
    }

    /// Wire a vector collaborator.
    pub fn with_vectors(mut self, vectors: Arc<dyn VectorStore>) -> Self {
        self.vectors = Some(vectors);
        self
    }
}
