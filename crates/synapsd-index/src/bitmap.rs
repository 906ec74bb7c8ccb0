use std::sync::Arc;

use roaring::RoaringBitmap;
use tracing::debug;

use synapsd_store::Dataset;
use synapsd_types::DocumentId;

use crate::cache::BitmapCache;
use crate::error::{IndexError, IndexResult};

/// A named collection of document-id bit-sets scoped to one namespace.
///
/// Each label owns one [`RoaringBitmap`]. Labels are created on first
/// tick; ticking and unticking are idempotent. Every mutation is applied
/// to the shared cache synchronously and written through to the backing
/// dataset before the call returns, so state is durable by the time the
/// owning engine closes.
///
/// Ids below `range_min` are reserved for internal system bit-sets and
/// are rejected as a contract violation.
pub struct LabelIndex {
    dataset: Arc<dyn Dataset>,
    cache: BitmapCache,
    tag: String,
    range_min: DocumentId,
}

impl LabelIndex {
    /// Create an index over `dataset`, sharing `cache` with sibling
    /// indexes. `tag` namespaces this index's cache entries; `range_min`
    /// is the lowest id it will ever accept.
    pub fn new(
        dataset: Arc<dyn Dataset>,
        cache: BitmapCache,
        tag: impl Into<String>,
        range_min: DocumentId,
    ) -> Self {
        Self {
            dataset,
            cache,
            tag: tag.into(),
            range_min,
        }
    }

    /// Namespace tag of this index ("contexts", "features", ...).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Lowest id this index accepts.
    pub fn range_min(&self) -> DocumentId {
        self.range_min
    }

    /// Add `id` to the bit-set of every label in `labels`.
    ///
    /// Unknown labels are created. Re-ticking an already-present id is a
    /// no-op.
    pub fn tick_many(&self, labels: &[String], id: DocumentId) -> IndexResult<()> {
        self.check_id(id)?;
        for label in labels {
            self.mutate(label, |bitmap| {
                bitmap.insert(id);
            })?;
        }
        if !labels.is_empty() {
            debug!(tag = %self.tag, id, labels = labels.len(), "ticked");
        }
        Ok(())
    }

    /// Remove `id` from the bit-set of every label in `labels`.
    ///
    /// Removing from a label that does not exist is a no-op.
    pub fn untick_many(&self, labels: &[String], id: DocumentId) -> IndexResult<()> {
        self.check_id(id)?;
        for label in labels {
            if self.load(label)?.is_none() {
                continue;
            }
            self.mutate(label, |bitmap| {
                bitmap.remove(id);
            })?;
        }
        if !labels.is_empty() {
            debug!(tag = %self.tag, id, labels = labels.len(), "unticked");
        }
        Ok(())
    }

    /// Remove `id` from every label that contains it. Returns the
    /// affected labels, ascending.
    pub fn untick_all(&self, id: DocumentId) -> IndexResult<Vec<String>> {
        self.check_id(id)?;
        let mut affected = Vec::new();
        for label in self.labels()? {
            let contains = self.load(&label)?.is_some_and(|b| b.contains(id));
            if contains {
                self.mutate(&label, |bitmap| {
                    bitmap.remove(id);
                })?;
                affected.push(label);
            }
        }
        Ok(affected)
    }

    /// Intersection of the bit-sets named by `labels`.
    ///
    /// `and(&[])` is the canonical empty set. A label with no bit-set
    /// contributes the empty set, so any unknown label empties the result.
    pub fn and(&self, labels: &[String]) -> IndexResult<RoaringBitmap> {
        let mut result: Option<RoaringBitmap> = None;
        for label in labels {
            let bitmap = match self.load(label)? {
                Some(b) => b,
                None => return Ok(RoaringBitmap::new()),
            };
            result = Some(match result {
                None => bitmap,
                Some(mut acc) => {
                    acc &= bitmap;
                    acc
                }
            });
            if result.as_ref().is_some_and(RoaringBitmap::is_empty) {
                break;
            }
        }
        Ok(result.unwrap_or_default())
    }

    /// Union of the bit-sets named by `labels`. `or(&[])` is empty.
    pub fn or(&self, labels: &[String]) -> IndexResult<RoaringBitmap> {
        let mut result = RoaringBitmap::new();
        for label in labels {
            if let Some(bitmap) = self.load(label)? {
                result |= bitmap;
            }
        }
        Ok(result)
    }

    /// All labels known to this index, ascending.
    pub fn labels(&self) -> IndexResult<Vec<String>> {
        let keys = self.dataset.keys()?;
        Ok(keys
            .into_iter()
            .map(|k| String::from_utf8_lossy(&k).into_owned())
            .collect())
    }

    fn check_id(&self, id: DocumentId) -> IndexResult<()> {
        if id < self.range_min {
            return Err(IndexError::IdBelowRange {
                id,
                range_min: self.range_min,
            });
        }
        Ok(())
    }

    fn cache_key(&self, label: &str) -> String {
        format!("{}/{}", self.tag, label)
    }

    /// Load a label's bit-set, populating the cache on a dataset hit.
    fn load(&self, label: &str) -> IndexResult<Option<RoaringBitmap>> {
        if label.is_empty() {
            return Err(IndexError::EmptyLabel);
        }
        let key = self.cache_key(label);
        if let Some(bitmap) = self.cache.read().get(&key) {
            return Ok(Some(bitmap.clone()));
        }
        let Some(bytes) = self.dataset.get(label.as_bytes())? else {
            return Ok(None);
        };
        let bitmap =
            RoaringBitmap::deserialize_from(&bytes[..]).map_err(|e| IndexError::Bitmap {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
        self.cache.write().insert(key, bitmap.clone());
        Ok(Some(bitmap))
    }

    /// Read-modify-write one label under the cache write lock, writing the
    /// new bit-set through to the dataset before releasing.
    fn mutate(&self, label: &str, apply: impl FnOnce(&mut RoaringBitmap)) -> IndexResult<()> {
        if label.is_empty() {
            return Err(IndexError::EmptyLabel);
        }
        let key = self.cache_key(label);
        let mut cache = self.cache.write();

        let mut bitmap = match cache.get(&key) {
            Some(b) => b.clone(),
            None => match self.dataset.get(label.as_bytes())? {
                Some(bytes) => RoaringBitmap::deserialize_from(&bytes[..]).map_err(|e| {
                    IndexError::Bitmap {
                        label: label.to_string(),
                        reason: e.to_string(),
                    }
                })?,
                None => RoaringBitmap::new(),
            },
        };

        apply(&mut bitmap);

        let mut bytes = Vec::with_capacity(bitmap.serialized_size());
        bitmap
            .serialize_into(&mut bytes)
            .map_err(|e| IndexError::Bitmap {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
        self.dataset.put(label.as_bytes(), bytes)?;
        cache.insert(key, bitmap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synapsd_store::{Datastore, InMemoryDatastore};
    use synapsd_types::RESERVED_ID_RANGE;

    const ID1: DocumentId = RESERVED_ID_RANGE + 1;
    const ID2: DocumentId = RESERVED_ID_RANGE + 2;
    const ID3: DocumentId = RESERVED_ID_RANGE + 3;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn index() -> LabelIndex {
        let store = InMemoryDatastore::new();
        let dataset = store.dataset("contexts").unwrap();
        LabelIndex::new(dataset, BitmapCache::new(), "contexts", RESERVED_ID_RANGE)
    }

    #[test]
    fn tick_creates_label_and_is_idempotent() {
        let index = index();
        index.tick_many(&labels(&["work"]), ID1).unwrap();
        index.tick_many(&labels(&["work"]), ID1).unwrap();

        let set = index.and(&labels(&["work"])).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ID1]);
    }

    #[test]
    fn untick_unknown_label_is_noop() {
        let index = index();
        index.untick_many(&labels(&["never-seen"]), ID1).unwrap();
        assert!(index.labels().unwrap().is_empty());
    }

    #[test]
    fn and_intersects() {
        let index = index();
        index.tick_many(&labels(&["a", "b"]), ID1).unwrap();
        index.tick_many(&labels(&["a"]), ID2).unwrap();

        let both = index.and(&labels(&["a", "b"])).unwrap();
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![ID1]);
    }

    #[test]
    fn and_of_empty_slice_is_empty() {
        let index = index();
        index.tick_many(&labels(&["a"]), ID1).unwrap();
        assert!(index.and(&[]).unwrap().is_empty());
    }

    #[test]
    fn and_with_unknown_label_is_empty() {
        let index = index();
        index.tick_many(&labels(&["a"]), ID1).unwrap();
        assert!(index.and(&labels(&["a", "ghost"])).unwrap().is_empty());
    }

    #[test]
    fn or_unions_ascending() {
        let index = index();
        index.tick_many(&labels(&["f1"]), ID3).unwrap();
        index.tick_many(&labels(&["f2"]), ID1).unwrap();
        index.tick_many(&labels(&["f1"]), ID2).unwrap();

        let set = index.or(&labels(&["f1", "f2"])).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ID1, ID2, ID3]);
        assert!(index.or(&[]).unwrap().is_empty());
    }

    #[test]
    fn partial_untick_leaves_other_labels() {
        let index = index();
        index.tick_many(&labels(&["a", "b"]), ID1).unwrap();
        index.untick_many(&labels(&["a"]), ID1).unwrap();

        assert!(index.and(&labels(&["a"])).unwrap().is_empty());
        assert!(index.and(&labels(&["b"])).unwrap().contains(ID1));
    }

    #[test]
    fn untick_all_reports_affected_labels() {
        let index = index();
        index.tick_many(&labels(&["a", "b", "c"]), ID1).unwrap();
        index.tick_many(&labels(&["b"]), ID2).unwrap();

        let affected = index.untick_all(ID1).unwrap();
        assert_eq!(affected, vec!["a", "b", "c"]);
        assert!(index.or(&labels(&["a", "b", "c"])).unwrap().contains(ID2));
        assert!(!index.or(&labels(&["a", "b", "c"])).unwrap().contains(ID1));
    }

    #[test]
    fn id_below_range_rejected() {
        let index = index();
        let err = index.tick_many(&labels(&["a"]), 7).unwrap_err();
        assert!(matches!(err, IndexError::IdBelowRange { id: 7, .. }));
    }

    #[test]
    fn empty_label_rejected() {
        let index = index();
        let err = index.tick_many(&labels(&[""]), ID1).unwrap_err();
        assert!(matches!(err, IndexError::EmptyLabel));
    }

    #[test]
    fn state_survives_cache_loss() {
        let store = InMemoryDatastore::new();
        let dataset = store.dataset("contexts").unwrap();
        let index = LabelIndex::new(
            Arc::clone(&dataset),
            BitmapCache::new(),
            "contexts",
            RESERVED_ID_RANGE,
        );
        index.tick_many(&labels(&["work"]), ID1).unwrap();

        // Fresh cache over the same dataset: write-through made it durable.
        let cold = LabelIndex::new(dataset, BitmapCache::new(), "contexts", RESERVED_ID_RANGE);
        assert!(cold.and(&labels(&["work"])).unwrap().contains(ID1));
    }

    #[test]
    fn sibling_indexes_share_cache_without_collision() {
        let store = InMemoryDatastore::new();
        let cache = BitmapCache::new();
        let contexts = LabelIndex::new(
            store.dataset("contexts").unwrap(),
            cache.clone(),
            "contexts",
            RESERVED_ID_RANGE,
        );
        let features = LabelIndex::new(
            store.dataset("features").unwrap(),
            cache.clone(),
            "features",
            RESERVED_ID_RANGE,
        );

        contexts.tick_many(&labels(&["same-name"]), ID1).unwrap();
        features.tick_many(&labels(&["same-name"]), ID2).unwrap();

        assert_eq!(
            contexts
                .and(&labels(&["same-name"]))
                .unwrap()
                .iter()
                .collect::<Vec<_>>(),
            vec![ID1]
        );
        assert_eq!(
            features
                .and(&labels(&["same-name"]))
                .unwrap()
                .iter()
                .collect::<Vec<_>>(),
            vec![ID2]
        );
        assert_eq!(cache.len(), 2);
    }
}
