//! Online schema evolution for stored documents.
//!
//! Every managed document carries a reserved version field; every database
//! carries a version marker. This module discovers items whose marker is
//! behind the application's target version, applies the ordered chain of
//! version-tagged transformation steps, and writes the results back in
//! bulk, idempotently and in strict version order.
//!
//! # Example
//!
//! ```ignore
//! use docshift_core::migration::{
//!     CollectionLocation, CollectionLocator, MigrationRegistry, MigrationSettings,
//!     StartUpDocumentMigrationRunner,
//! };
//!
//! let registry = Arc::new(
//!     MigrationRegistry::builder()
//!         .register_document(rename_amount)?   // produces 1.0.0
//!         .register_document(split_amount)?    // produces 2.0.0
//!         .build(),
//! );
//! let locator = CollectionLocator::builder()
//!     .location("Order", CollectionLocation::new("orders"))?
//!     .build();
//!
//! let settings = MigrationSettings::new()
//!     .with_path("./data")
//!     .with_database("shop");
//! let runner = StartUpDocumentMigrationRunner::new(settings, locator, registry)?;
//! let summary = runner.run_all()?;
//! ```

pub mod cancel;
pub mod database_runner;
pub mod document_runner;
pub mod error;
pub mod locator;
pub mod registry;
pub mod service;
pub mod startup;
pub mod step;

pub use cancel::CancelToken;
pub use database_runner::DatabaseMigrationRunner;
pub use document_runner::{DocumentMigrationRunner, RunSummary, RunnerConfig, DEFAULT_BATCH_SIZE};
pub use error::MigrationError;
pub use locator::{CollectionLocation, CollectionLocator, CollectionLocatorBuilder};
pub use registry::{MigrationRegistry, MigrationRegistryBuilder};
pub use service::{DocumentVersionService, DEFAULT_VERSION_FIELD};
pub use startup::{MigrationSettings, StartUpDatabaseMigrationRunner, StartUpDocumentMigrationRunner};
pub use step::{DatabaseMigration, DocumentMigration, FnDatabaseMigration, FnDocumentMigration};
