//! Sled-backed document store.
//!
//! Each (database, collection) pair maps to one sled tree; database-level
//! version markers live in a shared meta tree. Documents are stored as JSON
//! bytes keyed by the canonical `_id` encoding.

use std::path::PathBuf;

use sled::{Db, Tree};

use super::{DatabaseHandle, DocumentBatches, ReplaceOne, StaleFilter, StoreClient};
use crate::document::{self, Document, DocumentId};
use crate::error::Error;
use crate::version::Version;

/// Tree name for store metadata (database version markers).
const META_TREE: &str = "meta";

/// Prefix for database version markers in the meta tree.
const DB_VERSION_PREFIX: &[u8] = b"dbversion:";

/// Configuration for the sled-backed store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the store directory.
    pub path: PathBuf,

    /// Page cache capacity in bytes.
    pub cache_capacity: u64,

    /// Temporary store (deleted on drop).
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./docshift_data"),
            cache_capacity: 256 * 1024 * 1024,
            temporary: false,
        }
    }
}

impl StoreConfig {
    /// Create a configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a temporary configuration for testing.
    pub fn temporary() -> Self {
        Self {
            path: PathBuf::from(""),
            temporary: true,
            ..Default::default()
        }
    }

    fn to_sled_config(&self) -> sled::Config {
        let mut config = sled::Config::new().cache_capacity(self.cache_capacity);

        if self.temporary {
            config = config.temporary(true);
        } else {
            config = config.path(&self.path);
        }

        config
    }
}

/// The sled-backed store, implementing [`StoreClient`].
pub struct SledStore {
    db: Db,
    meta_tree: Tree,
}

impl SledStore {
    /// Open or create a store with the given configuration.
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let meta_tree = db.open_tree(META_TREE)?;

        Ok(Self { db, meta_tree })
    }

    /// Insert or replace a single document, keyed by its `_id` field.
    pub fn insert_document(
        &self,
        database: &str,
        collection: &str,
        document: &Document,
    ) -> Result<DocumentId, Error> {
        let id = document::document_id(document)?;
        let bytes = encode_document(document)?;
        self.collection_tree(database, collection)?
            .insert(id.as_bytes(), bytes)?;
        Ok(id)
    }

    /// Fetch a single document by primary key.
    pub fn get_document(
        &self,
        database: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, Error> {
        match self
            .collection_tree(database, collection)?
            .get(id.as_bytes())?
        {
            Some(bytes) => Ok(Some(decode_document(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of documents in a collection.
    pub fn count(&self, database: &str, collection: &str) -> Result<usize, Error> {
        Ok(self.collection_tree(database, collection)?.len())
    }

    /// Flush dirty buffers to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    fn collection_tree(&self, database: &str, collection: &str) -> Result<Tree, Error> {
        Ok(self.db.open_tree(collection_tree_name(database, collection))?)
    }
}

impl StoreClient for SledStore {
    fn database(&self, name: &str) -> Result<Box<dyn DatabaseHandle>, Error> {
        Ok(Box::new(SledDatabase {
            db: self.db.clone(),
            meta_tree: self.meta_tree.clone(),
            name: name.to_string(),
        }))
    }
}

fn collection_tree_name(database: &str, collection: &str) -> String {
    format!("doc:{database}:{collection}")
}

fn encode_document(document: &Document) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(document).map_err(|e| Error::Serialization(e.to_string()))
}

fn decode_document(bytes: &[u8]) -> Result<Document, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Handle bound to one logical database inside a [`SledStore`].
struct SledDatabase {
    db: Db,
    meta_tree: Tree,
    name: String,
}

impl SledDatabase {
    fn collection_tree(&self, collection: &str) -> Result<Tree, Error> {
        Ok(self
            .db
            .open_tree(collection_tree_name(&self.name, collection))?)
    }

    fn version_key(&self) -> Vec<u8> {
        let mut key = DB_VERSION_PREFIX.to_vec();
        key.extend_from_slice(self.name.as_bytes());
        key
    }
}

impl DatabaseHandle for SledDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_stale(
        &self,
        collection: &str,
        filter: &StaleFilter,
        batch_size: usize,
    ) -> Result<DocumentBatches, Error> {
        let mut iter = self.collection_tree(collection)?.iter();
        let filter = filter.clone();
        let batch_size = batch_size.max(1);

        let batches = std::iter::from_fn(move || {
            let mut batch = Vec::new();
            loop {
                match iter.next() {
                    Some(Ok((_, value))) => {
                        let document = match decode_document(&value) {
                            Ok(document) => document,
                            Err(e) => return Some(Err(e)),
                        };
                        if filter.matches(&document) {
                            batch.push(document);
                            if batch.len() >= batch_size {
                                return Some(Ok(batch));
                            }
                        }
                    }
                    Some(Err(e)) => return Some(Err(e.into())),
                    None if batch.is_empty() => return None,
                    None => return Some(Ok(batch)),
                }
            }
        });

        Ok(DocumentBatches::new(batches))
    }

    fn bulk_replace(&self, collection: &str, ops: Vec<ReplaceOne>) -> Result<usize, Error> {
        let tree = self.collection_tree(collection)?;
        let count = ops.len();

        let mut batch = sled::Batch::default();
        for op in ops {
            let bytes = encode_document(&op.document)?;
            batch.insert(op.id.as_bytes(), bytes);
        }
        tree.apply_batch(batch)?;

        Ok(count)
    }

    fn version(&self) -> Result<Option<Version>, Error> {
        match self.meta_tree.get(self.version_key())? {
            Some(bytes) => {
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::Deserialization(e.to_string()))?;
                text.parse()
                    .map(Some)
                    .map_err(|e: crate::version::VersionParseError| {
                        Error::Deserialization(e.to_string())
                    })
            }
            None => Ok(None),
        }
    }

    fn set_version(&self, version: Version) -> Result<(), Error> {
        self.meta_tree
            .insert(self.version_key(), version.to_string().as_bytes())?;
        Ok(())
    }
}
