//! docshift: online schema evolution for documents in a document store.
//!
//! Documents and databases carry a version marker; registered, version-tagged
//! transformation steps carry stale items forward to the application's target
//! version, in strict version order, with one bulk write per collection.
//!
//! This crate is a facade over [`docshift_core`]; see the
//! [`migration`](docshift_core::migration) module for the engine.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docshift::{
//!     CollectionLocation, CollectionLocator, FnDocumentMigration, MigrationError,
//!     MigrationRegistry, MigrationSettings, StartUpDocumentMigrationRunner, Version,
//! };
//!
//! fn main() -> Result<(), MigrationError> {
//!     let registry = Arc::new(
//!         MigrationRegistry::builder()
//!             .register_document(FnDocumentMigration::new(
//!                 "Order",
//!                 Version::new(1, 0, 0),
//!                 |document| {
//!                     if let Some(amount) = document.remove("amount") {
//!                         document.insert("amount_value".to_string(), amount);
//!                     }
//!                     Ok(())
//!                 },
//!             ))?
//!             .build(),
//!     );
//!     let locator = CollectionLocator::builder()
//!         .location("Order", CollectionLocation::new("orders"))?
//!         .build();
//!
//!     let settings = MigrationSettings::new()
//!         .with_path("./data")
//!         .with_database("shop");
//!     let runner = StartUpDocumentMigrationRunner::new(settings, locator, registry)?;
//!     let summary = runner.run_all()?;
//!     println!("migrated {} documents", summary.documents_migrated);
//!     Ok(())
//! }
//! ```

pub use docshift_core::{
    document, migration, store, version,
    document_id, stamp_version, stored_version,
    CancelToken, CollectionLocation, CollectionLocator, DatabaseHandle, DatabaseMigration,
    DatabaseMigrationRunner, Document, DocumentBatches, DocumentId, DocumentMigration,
    DocumentMigrationRunner, DocumentVersionService, Error, FnDatabaseMigration,
    FnDocumentMigration, MigrationError, MigrationRegistry, MigrationSettings, ReplaceOne,
    RunSummary, RunnerConfig, SledStore, StaleFilter, StartUpDatabaseMigrationRunner,
    StartUpDocumentMigrationRunner, StoreClient, StoreConfig, Version, VersionParseError,
    DEFAULT_VERSION_FIELD, ID_FIELD,
};
