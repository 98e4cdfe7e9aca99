//! Database-level migration runner.
//!
//! One logical unit of work per run: compare the database's stored version
//! marker against the latest registered database step and, if behind, apply
//! the chain strictly in order before stamping the new version.

use std::sync::Arc;

use tracing::{debug, info};

use super::error::MigrationError;
use super::registry::MigrationRegistry;
use crate::store::DatabaseHandle;
use crate::version::Version;

/// Applies whole-database steps (index changes, cross-collection scripts)
/// once per database.
pub struct DatabaseMigrationRunner {
    registry: Arc<MigrationRegistry>,
}

impl DatabaseMigrationRunner {
    /// Create a runner over a registry.
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self { registry }
    }

    /// Bring one database up to the latest registered database step.
    ///
    /// Failure is coarse-grained: any step failure aborts the remaining chain
    /// and leaves the stored version unchanged. The marker is only advanced
    /// after the whole chain has succeeded, never half-stamped.
    pub fn run(&self, database: &dyn DatabaseHandle) -> Result<(), MigrationError> {
        let Some(target) = self.registry.latest_database_version() else {
            debug!(database = database.name(), "no database migrations registered");
            return Ok(());
        };

        let current = database.version()?.unwrap_or(Version::ZERO);
        if current == target {
            debug!(
                database = database.name(),
                version = %current,
                "database already at target version"
            );
            return Ok(());
        }

        for step in self.registry.database_chain(current, target) {
            debug!(
                database = database.name(),
                version = %step.version(),
                "applying database migration"
            );
            step.migrate(database)?;
        }
        database.set_version(target)?;

        info!(
            database = database.name(),
            from = %current,
            to = %target,
            "database migrated"
        );

        Ok(())
    }
}
