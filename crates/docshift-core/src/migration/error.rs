//! Migration-specific error types.

use thiserror::Error;

use crate::version::Version;

/// Errors raised by the migration engine.
///
/// Configuration and resolution errors are fatal and surface from runner
/// construction or `run_all`; per-document transform failures are localized
/// and never raised through here; they are logged and counted instead.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// No usable connection source was configured.
    #[error("no store client available: configure a client, store settings, or a path")]
    NoClient,

    /// Neither an explicit location database nor a global default resolves.
    #[error("no database name resolvable for '{scope}'")]
    NoDatabaseName {
        /// The document type (or run scope) that failed to resolve.
        scope: String,
    },

    /// Two steps were registered producing the same version for one type.
    #[error("duplicate migration step for '{document_type}' producing version {version}")]
    DuplicateStep {
        /// The document type (or database pseudo-type) being registered.
        document_type: String,
        /// The version both steps claim to produce.
        version: Version,
    },

    /// A document type was registered with two collection locations.
    #[error("duplicate collection location for document type '{document_type}'")]
    DuplicateLocation {
        /// The document type registered twice.
        document_type: String,
    },

    /// A type has no configured target version and no registered steps.
    #[error("no version information for document type '{document_type}': no configured target and no registered steps")]
    NoVersionInformation {
        /// The document type lacking version information.
        document_type: String,
    },

    /// A transform step failed for one document.
    #[error("migration step to {version} failed for '{document_type}': {reason}")]
    StepFailed {
        /// The document type being migrated.
        document_type: String,
        /// The version the failing step produces.
        version: Version,
        /// The underlying failure.
        reason: String,
    },

    /// The run was cancelled before completing.
    #[error("migration run cancelled")]
    Cancelled,

    /// Store I/O error, fatal for the current run.
    #[error("store error: {0}")]
    Store(#[from] crate::error::Error),
}
