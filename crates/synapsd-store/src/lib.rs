//! Key-value storage collaborator for SynapsD.
//!
//! The engine never touches files or serialization formats directly; it
//! talks to named [`Dataset`]s obtained from a [`Datastore`]. A dataset is
//! an ordered byte-keyed map with get/put/has/delete/keys/stats.
//!
//! # Backends
//!
//! - [`InMemoryDatastore`] -- `BTreeMap`-based, for tests and embedding
//! - [`FileDatastore`] -- snapshot persistence: CRC-framed bincode blobs,
//!   optional zstd compression, atomic tmp-then-rename writes, and `.bak`
//!   restore points on open/close
//!
//! # Design Rules
//!
//! 1. Keys are opaque bytes; the store never interprets values.
//! 2. Mutations are visible to subsequent reads as soon as they return.
//! 3. Durability is a `flush()`/`close()` concern, not a per-put one.
//! 4. Corruption (CRC mismatch) is reported, never silently ignored.
//! 5. All I/O errors propagate; the store performs no retries.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileDatastore, StoreOptions};
pub use memory::{InMemoryDatastore, MemoryDataset};
pub use traits::{decode_record, encode_record, Dataset, DatasetStats, Datastore};
