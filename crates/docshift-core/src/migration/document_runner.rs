//! Document migration runner, the central algorithm.
//!
//! For each located collection: build the staleness filter, stream matching
//! documents in batches, apply each document's migration chain in strict
//! version order, and write the results back as one bulk replace per
//! collection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::error::MigrationError;
use super::locator::{CollectionLocation, CollectionLocator};
use super::registry::MigrationRegistry;
use super::service::DocumentVersionService;
use crate::document::{self, Document};
use crate::store::{ReplaceOne, StaleFilter, StoreClient};
use crate::version::Version;

/// Default number of documents fetched per cursor batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Configuration for the document migration runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Documents fetched per cursor batch.
    pub batch_size: usize,
    /// Database used when a location carries no explicit database name.
    pub default_database: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_database: None,
        }
    }
}

/// Counters accumulated over one `run_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Collections processed.
    pub collections_scanned: usize,
    /// Stale documents fetched from cursors.
    pub documents_examined: u64,
    /// Documents migrated and included in a write batch.
    pub documents_migrated: u64,
    /// Documents dropped from their batch after a transform failure.
    pub documents_failed: u64,
    /// Bulk writes submitted.
    pub batches_written: u64,
}

/// Selects stale documents, applies step chains, and writes results back in
/// bulk.
///
/// Collections are processed sequentially in locator order; within a
/// collection, each document's chain applies oldest-to-newest. Runs are
/// idempotent: documents already at the target version never match the
/// staleness filter, so re-running over a migrated store is a no-op.
///
/// Concurrent runs from separate processes are not coordinated; two engines
/// racing on the same stale document both rewrite it and the last bulk write
/// wins with a consistent document.
pub struct DocumentMigrationRunner {
    registry: Arc<MigrationRegistry>,
    service: Arc<DocumentVersionService>,
    locator: CollectionLocator,
    config: RunnerConfig,
}

impl DocumentMigrationRunner {
    /// Create a runner over a registry, version service, and locator.
    pub fn new(
        registry: Arc<MigrationRegistry>,
        service: Arc<DocumentVersionService>,
        locator: CollectionLocator,
        config: RunnerConfig,
    ) -> Self {
        Self {
            registry,
            service,
            locator,
            config,
        }
    }

    /// Migrate every stale document in every located collection.
    ///
    /// Per-document transform failures are logged, counted, and skipped;
    /// unresolvable database names and store I/O errors abort the whole run.
    pub fn run_all(
        &self,
        client: &dyn StoreClient,
        cancel: &CancelToken,
    ) -> Result<RunSummary, MigrationError> {
        let mut summary = RunSummary::default();

        for (document_type, location) in self.locator.locations() {
            let database_name = self.effective_database(document_type, location)?;
            let target = self
                .service
                .current_or_latest_migration_version(document_type)?;
            let filter = StaleFilter::new(self.service.version_field_name(), target);

            let database = client.database(&database_name)?;
            let cursor = database.find_stale(&location.collection, &filter, self.config.batch_size)?;

            let mut write_set: Vec<ReplaceOne> = Vec::new();

            for batch in cursor {
                if cancel.is_cancelled() {
                    return Err(MigrationError::Cancelled);
                }
                for mut doc in batch? {
                    summary.documents_examined += 1;

                    let id = match document::document_id(&doc) {
                        Ok(id) => id,
                        Err(e) => {
                            warn!(document_type, error = %e, "skipping document without usable id");
                            summary.documents_failed += 1;
                            continue;
                        }
                    };

                    match self.run(document_type, &mut doc, target) {
                        Ok(()) => {
                            write_set.push(ReplaceOne { id, document: doc });
                            summary.documents_migrated += 1;
                        }
                        Err(e) => {
                            warn!(document_type, id = %id, error = %e, "transform failed, document dropped from batch");
                            summary.documents_failed += 1;
                        }
                    }
                }
            }

            // Cancel before the bulk write, never mid-write.
            if cancel.is_cancelled() {
                return Err(MigrationError::Cancelled);
            }

            if write_set.is_empty() {
                debug!(
                    document_type,
                    collection = %location.collection,
                    "no stale documents"
                );
            } else {
                let written = database.bulk_replace(&location.collection, write_set)?;
                summary.batches_written += 1;
                info!(
                    document_type,
                    database = %database_name,
                    collection = %location.collection,
                    written,
                    target = %target,
                    "collection migrated"
                );
            }

            summary.collections_scanned += 1;
        }

        Ok(summary)
    }

    /// Carry one document from its stored version to `target`.
    ///
    /// An absent version field means the document predates versioning and the
    /// full chain applies. Steps apply in strict ascending order; the version
    /// field is stamped with `target` afterwards. A document stamped past the
    /// target gets an empty chain and is restamped.
    pub fn run(
        &self,
        document_type: &str,
        document: &mut Document,
        target: Version,
    ) -> Result<(), MigrationError> {
        let field = self.service.version_field_name();
        let current = document::stored_version(document, field)?.unwrap_or(Version::ZERO);

        for step in self.registry.document_chain(document_type, current, target) {
            step.migrate(document)
                .map_err(|e| MigrationError::StepFailed {
                    document_type: document_type.to_string(),
                    version: step.version(),
                    reason: e.to_string(),
                })?;
        }
        document::stamp_version(document, field, target);

        Ok(())
    }

    fn effective_database(
        &self,
        document_type: &str,
        location: &CollectionLocation,
    ) -> Result<String, MigrationError> {
        location
            .database_or(self.config.default_database.as_deref())
            .map(str::to_string)
            .ok_or_else(|| MigrationError::NoDatabaseName {
                scope: document_type.to_string(),
            })
    }
}
