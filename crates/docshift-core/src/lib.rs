//! docshift core: version-tagged schema evolution for document stores.
//!
//! This crate provides the migration engine: the version marker type, the
//! step registry, the collection locator, the document and database runners,
//! and the sled-backed store they run against.

pub mod document;
pub mod error;
pub mod migration;
pub mod store;
pub mod version;

pub use document::{document_id, stamp_version, stored_version, Document, DocumentId, ID_FIELD};
pub use error::Error;
pub use migration::{
    CancelToken, CollectionLocation, CollectionLocator, DatabaseMigration,
    DatabaseMigrationRunner, DocumentMigration, DocumentMigrationRunner, DocumentVersionService,
    FnDatabaseMigration, FnDocumentMigration, MigrationError, MigrationRegistry,
    MigrationSettings, RunSummary, RunnerConfig, StartUpDatabaseMigrationRunner,
    StartUpDocumentMigrationRunner, DEFAULT_VERSION_FIELD,
};
pub use store::{
    DatabaseHandle, DocumentBatches, ReplaceOne, SledStore, StaleFilter, StoreClient, StoreConfig,
};
pub use version::{Version, VersionParseError};
