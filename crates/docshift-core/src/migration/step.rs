//! Version-tagged transformation steps.

use super::error::MigrationError;
use crate::document::Document;
use crate::store::DatabaseHandle;
use crate::version::Version;

/// A single document-level transformation step.
///
/// `migrate` must behave as a pure function of the document body, with no
/// dependency on execution order beyond the declared version, so that
/// replaying a chain after a partial failure is safe.
pub trait DocumentMigration: Send + Sync {
    /// The document type this step applies to.
    fn document_type(&self) -> &str;

    /// The version this step produces.
    fn version(&self) -> Version;

    /// Transform the document in place.
    fn migrate(&self, document: &mut Document) -> Result<(), MigrationError>;
}

/// A whole-database transformation step: index changes, cross-collection
/// scripts, and other DDL-like operations run once per database.
pub trait DatabaseMigration: Send + Sync {
    /// The version this step produces.
    fn version(&self) -> Version;

    /// Apply the step against the whole database.
    fn migrate(&self, database: &dyn DatabaseHandle) -> Result<(), MigrationError>;
}

/// Closure-backed [`DocumentMigration`], for registering steps without
/// declaring a struct per step.
pub struct FnDocumentMigration {
    document_type: String,
    version: Version,
    transform: Box<dyn Fn(&mut Document) -> Result<(), MigrationError> + Send + Sync>,
}

impl FnDocumentMigration {
    /// Build a step from a transform closure.
    pub fn new<F>(document_type: impl Into<String>, version: Version, transform: F) -> Self
    where
        F: Fn(&mut Document) -> Result<(), MigrationError> + Send + Sync + 'static,
    {
        Self {
            document_type: document_type.into(),
            version,
            transform: Box::new(transform),
        }
    }
}

impl DocumentMigration for FnDocumentMigration {
    fn document_type(&self) -> &str {
        &self.document_type
    }

    fn version(&self) -> Version {
        self.version
    }

    fn migrate(&self, document: &mut Document) -> Result<(), MigrationError> {
        (self.transform)(document)
    }
}

/// Closure-backed [`DatabaseMigration`].
pub struct FnDatabaseMigration {
    version: Version,
    transform: Box<dyn Fn(&dyn DatabaseHandle) -> Result<(), MigrationError> + Send + Sync>,
}

impl FnDatabaseMigration {
    /// Build a step from a transform closure.
    pub fn new<F>(version: Version, transform: F) -> Self
    where
        F: Fn(&dyn DatabaseHandle) -> Result<(), MigrationError> + Send + Sync + 'static,
    {
        Self {
            version,
            transform: Box::new(transform),
        }
    }
}

impl DatabaseMigration for FnDatabaseMigration {
    fn version(&self) -> Version {
        self.version
    }

    fn migrate(&self, database: &dyn DatabaseHandle) -> Result<(), MigrationError> {
        (self.transform)(database)
    }
}
