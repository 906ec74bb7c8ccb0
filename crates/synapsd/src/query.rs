use chrono::{DateTime, Utc};

use synapsd_types::{Document, DocumentId};

/// Record-level filters applied after bitmap composition.
///
/// Only the time-range bounds are evaluated by the core; richer predicates
/// belong to the host application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilters {
    /// Keep documents created at or after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Keep documents created at or before this instant.
    pub created_before: Option<DateTime<Utc>>,
}

impl QueryFilters {
    /// Returns `true` if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.created_after.is_none() && self.created_before.is_none()
    }

    /// Test a hydrated record against the time bounds.
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(after) = self.created_after {
            if document.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if document.created_at > before {
                return false;
            }
        }
        true
    }
}

/// Result-shaping options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Hydrate each id into its metadata record.
    pub return_metadata: bool,
    /// Truncate the result to this many entries, preserving order.
    pub limit: Option<usize>,
}

/// Outcome of a list/find query: bare ids, or hydrated records.
///
/// Hydration preserves id order; an id whose metadata record is missing
/// surfaces as `None` in its slot rather than failing the whole query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult {
    /// Matching ids, ascending.
    Ids(Vec<DocumentId>),
    /// Hydrated records, one slot per matching id.
    Records(Vec<Option<Document>>),
}

impl QueryResult {
    /// Number of entries in the result.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Ids(ids) => ids.len(),
            QueryResult::Records(records) => records.len(),
        }
    }

    /// Returns `true` for a result with no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids, when this is an id result.
    pub fn as_ids(&self) -> Option<&[DocumentId]> {
        match self {
            QueryResult::Ids(ids) => Some(ids),
            QueryResult::Records(_) => None,
        }
    }

    /// The records, when this is a hydrated result.
    pub fn as_records(&self) -> Option<&[Option<Document>]> {
        match self {
            QueryResult::Ids(_) => None,
            QueryResult::Records(records) => Some(records),
        }
    }
}
