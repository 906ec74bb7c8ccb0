use std::sync::{Arc, Mutex};

use roaring::RoaringBitmap;
use tracing::{debug, info};

use synapsd_index::{BitmapCache, ChecksumIndex, LabelIndex};
use synapsd_store::{Datastore, FileDatastore, StoreOptions};
use synapsd_types::{
    Action, Document, DocumentId, DocumentInput, ValidationError, RESERVED_ID_RANGE,
};

use crate::allocator::IdAllocator;
use crate::config::SynapsdOptions;
use crate::error::{SynapsdError, SynapsdResult};
use crate::events::{EngineEvent, EventRouter, EventStream};
use crate::memory::{NoopFullText, NoopVectors};
use crate::metadata::MetadataStore;
use crate::query::{QueryFilters, QueryOptions, QueryResult};
use crate::traits::{FullTextIndex, VectorStore};

/// Dataset names owned by one engine instance.
const DS_METADATA: &str = "metadata";
const DS_CHECKSUMS: &str = "checksums";
const DS_CONTEXTS: &str = "contexts";
const DS_FEATURES: &str = "features";
const DS_INTERNAL: &str = "internal";

/// The document indexing engine.
///
/// Owns the metadata store, the checksum index, and the two label bitmap
/// indexes for its entire lifetime; they are torn down together on
/// [`close`](SynapsD::close).
///
/// The API is synchronous. One engine-level mutex serializes the whole
/// mutation pipeline (allocation, metadata write, checksum entries,
/// bitmap ticks), so label-space reads only ever observe fully applied
/// mutations. Within a mutation, ordering is metadata first, then
/// checksums, then bitmaps: a failure mid-pipeline leaves the document
/// discoverable by id and checksum but absent from label queries, which
/// is the documented degraded state.
pub struct SynapsD {
    datastore: Arc<dyn Datastore>,
    metadata: MetadataStore,
    checksums: ChecksumIndex,
    contexts: LabelIndex,
    features: LabelIndex,
    allocator: IdAllocator,
    router: EventRouter,
    fulltext: Arc<dyn FullTextIndex>,
    vectors: Arc<dyn VectorStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SynapsD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynapsD").finish_non_exhaustive()
    }
}

impl SynapsD {
    /// Open an engine from constructor options.
    ///
    /// A storage path is required unless an existing datastore is
    /// supplied.
    pub fn open(options: SynapsdOptions) -> SynapsdResult<Self> {
        let datastore: Arc<dyn Datastore> = match (options.datastore, &options.path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileDatastore::open(
                path,
                StoreOptions {
                    backup_on_open: options.backup_on_open,
                    backup_on_close: options.backup_on_close,
                    compression: options.compression,
                },
            )?),
            (None, None) => {
                return Err(SynapsdError::Configuration(
                    "storage path required when no datastore is supplied".into(),
                ))
            }
        };

        let cache = options.cache.unwrap_or_else(BitmapCache::new);
        let channel_capacity = if options.channel_capacity == 0 {
            1024
        } else {
            options.channel_capacity
        };

        let metadata = MetadataStore::new(datastore.dataset(DS_METADATA)?);
        let checksums = ChecksumIndex::new(datastore.dataset(DS_CHECKSUMS)?);
        let contexts = LabelIndex::new(
            datastore.dataset(DS_CONTEXTS)?,
            cache.clone(),
            DS_CONTEXTS,
            RESERVED_ID_RANGE,
        );
        let features = LabelIndex::new(
            datastore.dataset(DS_FEATURES)?,
            cache,
            DS_FEATURES,
            RESERVED_ID_RANGE,
        );
        let allocator = IdAllocator::open(datastore.dataset(DS_INTERNAL)?, RESERVED_ID_RANGE)?;

        info!(
            document_count = metadata.count()?,
            next_id = allocator.current() + 1,
            "engine opened"
        );

        Ok(Self {
            datastore,
            metadata,
            checksums,
            contexts,
            features,
            allocator,
            router: EventRouter::new(channel_capacity),
            fulltext: options
                .fulltext
                .unwrap_or_else(|| Arc::new(NoopFullText)),
            vectors: options.vectors.unwrap_or_else(|| Arc::new(NoopVectors)),
            write_lock: Mutex::new(()),
        })
    }

    /// Validate, persist, and index a new document. Returns its id.
    pub fn insert_document(
        &self,
        input: DocumentInput,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<DocumentId> {
        input.validate()?;
        let _guard = self.write_lock.lock().expect("write lock poisoned");

        let id = match input.id {
            Some(0) => return Err(ValidationError::InvalidId.into()),
            Some(id) if id <= RESERVED_ID_RANGE => {
                return Err(ValidationError::ReservedId(id).into())
            }
            Some(id) => {
                self.allocator.reserve(id)?;
                id
            }
            None => self.allocator.next()?,
        };

        self.apply_write(input, id, Action::Insert, contexts, features)?;
        self.router.emit(EngineEvent::Insert { id });
        debug!(id, "document inserted");
        Ok(id)
    }

    /// Replace an existing document in place. The id is taken from the
    /// input and must be present.
    pub fn update_document(
        &self,
        input: DocumentInput,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<DocumentId> {
        input.validate()?;
        let id = match input.id {
            None => return Err(ValidationError::MissingId.into()),
            Some(0) => return Err(ValidationError::InvalidId.into()),
            Some(id) if id <= RESERVED_ID_RANGE => {
                return Err(ValidationError::ReservedId(id).into())
            }
            Some(id) => id,
        };
        let _guard = self.write_lock.lock().expect("write lock poisoned");

        self.allocator.reserve(id)?;
        self.apply_write(input, id, Action::Update, contexts, features)?;
        self.router.emit(EngineEvent::Update { id });
        debug!(id, "document updated");
        Ok(id)
    }

    /// Shared insert/update pipeline. Caller holds the write lock.
    fn apply_write(
        &self,
        input: DocumentInput,
        id: DocumentId,
        action: Action,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<()> {
        let created_at = self.metadata.get(id)?.map(|existing| existing.created_at);
        let document = input.into_document(id, action, created_at);

        self.metadata.put(&document)?;
        for (algorithm, digest) in &document.checksums {
            self.checksums.put(algorithm, digest, id)?;
        }
        self.contexts.tick_many(contexts, id)?;
        self.features.tick_many(features, id)?;

        match action {
            Action::Insert => self.fulltext.insert(id, &document.search_terms)?,
            _ => self.fulltext.update(id, &document.search_terms)?,
        }
        self.vectors.upsert(id, &document.embeddings)?;
        Ok(())
    }

    /// Unindex a document from the given label subsets.
    ///
    /// Labels not passed stay untouched, so removal from a subset of
    /// label spaces is supported. The metadata record and checksum
    /// entries remain addressable; see [`delete_document`](Self::delete_document)
    /// for the hard delete. `Ok(None)` when no such document exists.
    pub fn remove_document(
        &self,
        id: DocumentId,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<Option<DocumentId>> {
        if id == 0 {
            return Err(ValidationError::InvalidId.into());
        }
        let _guard = self.write_lock.lock().expect("write lock poisoned");

        if !self.metadata.has(id)? {
            return Ok(None);
        }
        self.contexts.untick_many(contexts, id)?;
        self.features.untick_many(features, id)?;

        self.router.emit(EngineEvent::Remove {
            id,
            contexts: contexts.to_vec(),
            features: features.to_vec(),
        });
        debug!(id, "document unindexed");
        Ok(Some(id))
    }

    /// Hard-delete a document: metadata record, its checksum entries, its
    /// membership in every label bit-set, and collaborator state.
    ///
    /// A checksum entry is only dropped while it still points at this
    /// document; an entry repointed by a newer duplicate is left alone.
    /// `Ok(None)` when no such document exists.
    pub fn delete_document(&self, id: DocumentId) -> SynapsdResult<Option<DocumentId>> {
        if id == 0 {
            return Err(ValidationError::InvalidId.into());
        }
        let _guard = self.write_lock.lock().expect("write lock poisoned");

        let Some(document) = self.metadata.get(id)? else {
            return Ok(None);
        };
        for (algorithm, digest) in &document.checksums {
            if self.checksums.resolve(algorithm, digest)? == Some(id) {
                self.checksums.remove(algorithm, digest)?;
            }
        }
        self.contexts.untick_all(id)?;
        self.features.untick_all(id)?;
        self.metadata.delete(id)?;
        self.fulltext.remove(id)?;
        self.vectors.remove(id)?;

        self.router.emit(EngineEvent::Delete { id });
        debug!(id, "document deleted");
        Ok(Some(id))
    }

    /// Membership test against the composed context/feature query set.
    ///
    /// Empty context and feature slices each mean "no constraint"; with
    /// both empty this reduces to a metadata existence check.
    pub fn has_document(
        &self,
        id: DocumentId,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<bool> {
        if id == 0 {
            return Err(ValidationError::InvalidId.into());
        }
        if !self.metadata.has(id)? {
            return Ok(false);
        }
        Ok(match self.compose(contexts, features)? {
            None => true,
            Some(set) => set.contains(id),
        })
    }

    /// List documents matching the composed context/feature query set.
    ///
    /// Results come back in ascending id order. `filters` prunes by the
    /// record time bounds; `options` controls hydration and truncation.
    pub fn list_documents(
        &self,
        contexts: &[String],
        features: &[String],
        filters: &QueryFilters,
        options: &QueryOptions,
    ) -> SynapsdResult<QueryResult> {
        let ids = match self.compose(contexts, features)? {
            Some(set) => set.iter().collect(),
            None => self.metadata.ids()?,
        };
        self.shape_result(ids, filters, options)
    }

    /// Free-text query via the full-text collaborator, intersected with
    /// the composed context/feature set.
    pub fn find_documents(
        &self,
        query: &str,
        contexts: &[String],
        features: &[String],
        filters: &QueryFilters,
        options: &QueryOptions,
    ) -> SynapsdResult<QueryResult> {
        let mut ids = self.fulltext.search(query)?;
        if let Some(set) = self.compose(contexts, features)? {
            ids.retain(|id| set.contains(*id));
        }
        self.shape_result(ids, filters, options)
    }

    /// The stored record for `id`, or `None`.
    pub fn get_metadata(&self, id: DocumentId) -> SynapsdResult<Option<Document>> {
        if id == 0 {
            return Err(ValidationError::InvalidId.into());
        }
        Ok(self.metadata.get(id)?)
    }

    /// Resolve `(algorithm, digest)` through the checksum index, then
    /// fetch the record it points at.
    pub fn get_metadata_for_checksum(
        &self,
        algorithm: &str,
        digest: &str,
    ) -> SynapsdResult<Option<Document>> {
        if algorithm.is_empty() {
            return Err(ValidationError::EmptyAlgorithm.into());
        }
        if digest.is_empty() {
            return Err(ValidationError::EmptyDigest.into());
        }
        match self.checksums.resolve(algorithm, digest)? {
            Some(id) => self.get_metadata(id),
            None => Ok(None),
        }
    }

    /// Live document count.
    pub fn object_count(&self) -> SynapsdResult<u64> {
        Ok(self.metadata.count()?)
    }

    /// Subscribe to engine notifications. Dropping the stream
    /// unsubscribes.
    pub fn subscribe(&self) -> EventStream {
        self.router.subscribe()
    }

    /// Number of live notification subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }

    /// Flush and release the underlying storage. Operations after close
    /// are undefined; callers must not invoke them.
    pub fn close(&self) -> SynapsdResult<()> {
        self.datastore.close()?;
        info!("engine closed");
        Ok(())
    }

    /// Build the query set both `has_document` and `list_documents`
    /// share: `AND(contexts) ∩ OR(features)`, where an empty label slice
    /// contributes no constraint. `None` means fully unconstrained.
    fn compose(
        &self,
        contexts: &[String],
        features: &[String],
    ) -> SynapsdResult<Option<RoaringBitmap>> {
        let context_set = if contexts.is_empty() {
            None
        } else {
            Some(self.contexts.and(contexts)?)
        };
        let feature_set = if features.is_empty() {
            None
        } else {
            Some(self.features.or(features)?)
        };

        Ok(match (context_set, feature_set) {
            (None, None) => None,
            (Some(set), None) | (None, Some(set)) => Some(set),
            (Some(mut contexts), Some(features)) => {
                contexts &= features;
                Some(contexts)
            }
        })
    }

    /// Apply record filters, truncate, and optionally hydrate.
    fn shape_result(
        &self,
        mut ids: Vec<DocumentId>,
        filters: &QueryFilters,
        options: &QueryOptions,
    ) -> SynapsdResult<QueryResult> {
        if !filters.is_empty() {
            let mut kept = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(document) = self.metadata.get(id)? {
                    if filters.matches(&document) {
                        kept.push(id);
                    }
                }
            }
            ids = kept;
        }

        if let Some(limit) = options.limit {
            ids.truncate(limit);
        }

        if options.return_metadata {
            let mut records = Vec::with_capacity(ids.len());
            for id in &ids {
                records.push(self.metadata.get(*id)?);
            }
            Ok(QueryResult::Records(records))
        } else {
            Ok(QueryResult::Ids(ids))
        }
    }
}
