//! Store interface the migration engine runs against.
//!
//! The engine depends only on the [`StoreClient`] and [`DatabaseHandle`]
//! traits: a filtered, batched read returning document snapshots, a bulk
//! replace-by-primary-key write, and the database-level version marker.
//! [`SledStore`] is the built-in sled-backed implementation.

pub mod engine;

pub use engine::{SledStore, StoreConfig};

use crate::document::{Document, DocumentId};
use crate::error::Error;
use crate::version::Version;

/// A replace-whole-document-by-primary-key write operation.
#[derive(Debug, Clone)]
pub struct ReplaceOne {
    /// Primary key of the document to replace.
    pub id: DocumentId,
    /// The full replacement document.
    pub document: Document,
}

/// Filter selecting documents whose version marker is not at the target.
///
/// Matches any document where the version field is absent, unparseable, or
/// holds a version other than `target`. This is a not-equal test, not a
/// less-than test: a document stamped with a version greater than the target
/// is also selected and will be restamped to the target.
#[derive(Debug, Clone)]
pub struct StaleFilter {
    /// Name of the reserved version field.
    pub field: String,
    /// The run's target version.
    pub target: Version,
}

impl StaleFilter {
    /// Create a filter for a version field and target.
    pub fn new(field: impl Into<String>, target: Version) -> Self {
        Self {
            field: field.into(),
            target,
        }
    }

    /// Whether a document is stale under this filter.
    pub fn matches(&self, document: &Document) -> bool {
        match document.get(&self.field) {
            None => true,
            Some(serde_json::Value::String(text)) => text
                .parse::<Version>()
                .map(|version| version != self.target)
                .unwrap_or(true),
            Some(_) => true,
        }
    }
}

/// Batched cursor over matching documents.
///
/// Yields `Vec<Document>` batches lazily; the full stale set is never
/// materialized at once.
pub struct DocumentBatches {
    inner: Box<dyn Iterator<Item = Result<Vec<Document>, Error>>>,
}

impl DocumentBatches {
    /// Wrap a batch iterator.
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = Result<Vec<Document>, Error>> + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Iterator for DocumentBatches {
    type Item = Result<Vec<Document>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Handle bound to one logical database.
pub trait DatabaseHandle {
    /// Name of the database this handle is bound to.
    fn name(&self) -> &str;

    /// Stream documents in `collection` matching `filter`, in batches of at
    /// most `batch_size`.
    fn find_stale(
        &self,
        collection: &str,
        filter: &StaleFilter,
        batch_size: usize,
    ) -> Result<DocumentBatches, Error>;

    /// Submit a batch of replace operations as one bulk write.
    ///
    /// The batch is applied with the store's own atomicity guarantees: it is
    /// either fully submitted or reported as failed, never partially retained
    /// by the engine.
    fn bulk_replace(&self, collection: &str, ops: Vec<ReplaceOne>) -> Result<usize, Error>;

    /// The database-level version marker, if one has been stamped.
    fn version(&self) -> Result<Option<Version>, Error>;

    /// Stamp the database-level version marker.
    fn set_version(&self, version: Version) -> Result<(), Error>;
}

/// Connection to a document store, able to hand out database handles.
pub trait StoreClient: Send + Sync {
    /// Resolve a handle bound to `name`.
    fn database(&self, name: &str) -> Result<Box<dyn DatabaseHandle>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_filter_matches_absent_field() {
        let filter = StaleFilter::new("version", Version::new(1, 0, 0));
        assert!(filter.matches(&doc(json!({ "_id": 1 }))));
    }

    #[test]
    fn test_filter_skips_documents_at_target() {
        let filter = StaleFilter::new("version", Version::new(1, 0, 0));
        assert!(!filter.matches(&doc(json!({ "_id": 1, "version": "1.0.0" }))));
    }

    #[test]
    fn test_filter_matches_older_version() {
        let filter = StaleFilter::new("version", Version::new(2, 0, 0));
        assert!(filter.matches(&doc(json!({ "_id": 1, "version": "1.0.0" }))));
    }

    #[test]
    fn test_filter_matches_future_version() {
        // Not-equal semantics: a future stamp is treated as stale too.
        let filter = StaleFilter::new("version", Version::new(1, 0, 0));
        assert!(filter.matches(&doc(json!({ "_id": 1, "version": "3.0.0" }))));
    }

    #[test]
    fn test_filter_matches_malformed_version() {
        let filter = StaleFilter::new("version", Version::new(1, 0, 0));
        assert!(filter.matches(&doc(json!({ "_id": 1, "version": "latest" }))));
        assert!(filter.matches(&doc(json!({ "_id": 1, "version": 7 }))));
    }
}
