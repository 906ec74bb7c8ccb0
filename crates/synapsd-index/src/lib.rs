//! Bit-set indexes for SynapsD.
//!
//! Two index families live here:
//!
//! - [`LabelIndex`] -- a named collection of roaring bit-sets scoped to one
//!   namespace ("contexts" or "features"). Ticking a label adds a document
//!   id to that label's set; queries compose sets with AND (intersection)
//!   or OR (union).
//! - [`ChecksumIndex`] -- the inverted `"<algorithm>/<digest>" -> id`
//!   mapping used for content deduplication lookup.
//!
//! All label indexes of one engine share a [`BitmapCache`]; mutations of
//! the same label serialize through it, and every mutation is written
//! through to the backing dataset before returning.

pub mod bitmap;
pub mod cache;
pub mod checksum;
pub mod error;

pub use bitmap::LabelIndex;
pub use cache::BitmapCache;
pub use checksum::ChecksumIndex;
pub use error::{IndexError, IndexResult};
