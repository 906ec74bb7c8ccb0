use std::sync::{Arc, Mutex};

use tracing::debug;

use synapsd_store::{Dataset, StoreError, StoreResult};
use synapsd_types::DocumentId;

/// Storage key of the persisted allocation cursor.
const CURSOR_KEY: &[u8] = b"id/next";

/// Persisted monotonic document-id sequence.
///
/// The cursor lives in the internal system dataset and is written through
/// *before* an id is handed out, so neither a process restart nor
/// concurrent allocation can produce duplicate ids. The sequence starts
/// at the reserved-range floor; the first allocated id is `floor + 1`.
pub struct IdAllocator {
    dataset: Arc<dyn Dataset>,
    cursor: Mutex<DocumentId>,
}

impl IdAllocator {
    /// Open the allocator over the internal dataset, resuming a persisted
    /// cursor when one exists.
    pub fn open(dataset: Arc<dyn Dataset>, floor: DocumentId) -> StoreResult<Self> {
        let cursor = match dataset.get(CURSOR_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Serialization("id cursor entry is not 4 bytes".into())
                })?;
                DocumentId::from_le_bytes(arr).max(floor)
            }
            None => floor,
        };
        debug!(cursor, "id allocator opened");
        Ok(Self {
            dataset,
            cursor: Mutex::new(cursor),
        })
    }

    /// Allocate the next id. Durable before it is returned.
    pub fn next(&self) -> StoreResult<DocumentId> {
        let mut cursor = self.cursor.lock().expect("allocator lock poisoned");
        let id = *cursor + 1;
        self.dataset.put(CURSOR_KEY, id.to_le_bytes().to_vec())?;
        *cursor = id;
        Ok(id)
    }

    /// Fast-forward past a caller-supplied id so future allocations never
    /// collide with it. Ids at or below the cursor need no reservation.
    pub fn reserve(&self, id: DocumentId) -> StoreResult<()> {
        let mut cursor = self.cursor.lock().expect("allocator lock poisoned");
        if id > *cursor {
            self.dataset.put(CURSOR_KEY, id.to_le_bytes().to_vec())?;
            *cursor = id;
        }
        Ok(())
    }

    /// The most recently allocated or reserved id.
    pub fn current(&self) -> DocumentId {
        *self.cursor.lock().expect("allocator lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synapsd_store::{Datastore, InMemoryDatastore};
    use synapsd_types::RESERVED_ID_RANGE;

    #[test]
    fn first_id_is_floor_plus_one() {
        let store = InMemoryDatastore::new();
        let alloc =
            IdAllocator::open(store.dataset("internal").unwrap(), RESERVED_ID_RANGE).unwrap();
        assert_eq!(alloc.next().unwrap(), RESERVED_ID_RANGE + 1);
        assert_eq!(alloc.next().unwrap(), RESERVED_ID_RANGE + 2);
    }

    #[test]
    fn cursor_survives_reopen() {
        let store = InMemoryDatastore::new();
        let dataset = store.dataset("internal").unwrap();

        let alloc = IdAllocator::open(Arc::clone(&dataset), RESERVED_ID_RANGE).unwrap();
        alloc.next().unwrap();
        alloc.next().unwrap();
        drop(alloc);

        let reopened = IdAllocator::open(dataset, RESERVED_ID_RANGE).unwrap();
        assert_eq!(reopened.next().unwrap(), RESERVED_ID_RANGE + 3);
    }

    #[test]
    fn reserve_fast_forwards() {
        let store = InMemoryDatastore::new();
        let alloc =
            IdAllocator::open(store.dataset("internal").unwrap(), RESERVED_ID_RANGE).unwrap();

        alloc.reserve(RESERVED_ID_RANGE + 10).unwrap();
        assert_eq!(alloc.next().unwrap(), RESERVED_ID_RANGE + 11);

        // Reserving an already-passed id changes nothing.
        alloc.reserve(RESERVED_ID_RANGE + 5).unwrap();
        assert_eq!(alloc.next().unwrap(), RESERVED_ID_RANGE + 12);
    }

    #[test]
    fn concurrent_allocation_yields_distinct_ids() {
        use std::collections::HashSet;
        use std::thread;

        let store = InMemoryDatastore::new();
        let alloc = Arc::new(
            IdAllocator::open(store.dataset("internal").unwrap(), RESERVED_ID_RANGE).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = Arc::clone(&alloc);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| alloc.next().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(id > RESERVED_ID_RANGE);
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 200);
    }
}
