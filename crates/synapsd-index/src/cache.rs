use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roaring::RoaringBitmap;

/// Process-wide bitmap cache shared by sibling label indexes.
///
/// Keys are namespaced `"<tag>/<label>"`, so the contexts and features
/// indexes of one engine coexist without colliding. Cloning is cheap; all
/// clones share the same underlying map. Mutators of the same label
/// serialize through the write lock; mutation of one label never corrupts
/// another's state.
#[derive(Clone, Default)]
pub struct BitmapCache {
    inner: Arc<RwLock<HashMap<String, RoaringBitmap>>>,
}

impl BitmapCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached bit-sets.
    pub fn len(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("cache lock poisoned").is_empty()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RoaringBitmap>> {
        self.inner.read().expect("cache lock poisoned")
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RoaringBitmap>> {
        self.inner.write().expect("cache lock poisoned")
    }
}

impl std::fmt::Debug for BitmapCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapCache")
            .field("cached_bitmaps", &self.len())
            .finish()
    }
}
