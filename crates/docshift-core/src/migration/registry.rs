//! Registry of migration steps, ordered by produced version.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use super::error::MigrationError;
use super::step::{DatabaseMigration, DocumentMigration};
use crate::version::Version;

/// Pseudo-type under which database-level steps are reported in errors.
const DATABASE_SCOPE: &str = "$database";

/// Builder collecting steps at startup. Duplicate `(type, version)` pairs are
/// rejected at registration, never silently overwritten.
#[derive(Default)]
pub struct MigrationRegistryBuilder {
    document_steps: BTreeMap<String, BTreeMap<Version, Arc<dyn DocumentMigration>>>,
    database_steps: BTreeMap<Version, Arc<dyn DatabaseMigration>>,
}

impl MigrationRegistryBuilder {
    /// Register a document-level step.
    pub fn register_document(
        mut self,
        step: impl DocumentMigration + 'static,
    ) -> Result<Self, MigrationError> {
        let document_type = step.document_type().to_string();
        let version = step.version();

        let steps = self.document_steps.entry(document_type.clone()).or_default();
        if steps.contains_key(&version) {
            return Err(MigrationError::DuplicateStep {
                document_type,
                version,
            });
        }
        steps.insert(version, Arc::new(step));

        Ok(self)
    }

    /// Register a database-level step.
    pub fn register_database(
        mut self,
        step: impl DatabaseMigration + 'static,
    ) -> Result<Self, MigrationError> {
        let version = step.version();

        if self.database_steps.contains_key(&version) {
            return Err(MigrationError::DuplicateStep {
                document_type: DATABASE_SCOPE.to_string(),
                version,
            });
        }
        self.database_steps.insert(version, Arc::new(step));

        Ok(self)
    }

    /// Finish registration.
    pub fn build(self) -> MigrationRegistry {
        MigrationRegistry {
            document_steps: self.document_steps,
            database_steps: self.database_steps,
        }
    }
}

/// Immutable, load-once registry of all known migration steps.
///
/// Owned for the process lifetime and shared as `Arc<MigrationRegistry>`.
pub struct MigrationRegistry {
    document_steps: BTreeMap<String, BTreeMap<Version, Arc<dyn DocumentMigration>>>,
    database_steps: BTreeMap<Version, Arc<dyn DatabaseMigration>>,
}

impl MigrationRegistry {
    /// Start collecting steps.
    pub fn builder() -> MigrationRegistryBuilder {
        MigrationRegistryBuilder::default()
    }

    /// All steps for a type, ascending by produced version.
    pub fn document_steps(&self, document_type: &str) -> Vec<Arc<dyn DocumentMigration>> {
        self.document_steps
            .get(document_type)
            .map(|steps| steps.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Highest version reachable via registered steps for a type.
    pub fn latest_document_version(&self, document_type: &str) -> Option<Version> {
        self.document_steps
            .get(document_type)
            .and_then(|steps| steps.keys().next_back().copied())
    }

    /// Highest version reachable via registered database-level steps.
    pub fn latest_database_version(&self) -> Option<Version> {
        self.database_steps.keys().next_back().copied()
    }

    /// Ordered chain carrying a document from `from` (exclusive) to `to`
    /// (inclusive). Computed fresh per document; empty when `from >= to`.
    pub fn document_chain(
        &self,
        document_type: &str,
        from: Version,
        to: Version,
    ) -> Vec<Arc<dyn DocumentMigration>> {
        if from >= to {
            return Vec::new();
        }
        self.document_steps
            .get(document_type)
            .map(|steps| {
                steps
                    .range((Bound::Excluded(from), Bound::Included(to)))
                    .map(|(_, step)| Arc::clone(step))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ordered database-level chain from `from` (exclusive) to `to` (inclusive).
    pub fn database_chain(&self, from: Version, to: Version) -> Vec<Arc<dyn DatabaseMigration>> {
        if from >= to {
            return Vec::new();
        }
        self.database_steps
            .range((Bound::Excluded(from), Bound::Included(to)))
            .map(|(_, step)| Arc::clone(step))
            .collect()
    }
}
