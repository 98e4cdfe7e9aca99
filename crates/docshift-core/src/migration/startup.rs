//! Startup orchestrators: resolve a client and database, then delegate to
//! the runners.
//!
//! All misconfiguration is detected here, at construction. A missing
//! connection source or an unresolvable database name never waits until
//! `run_all`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::cancel::CancelToken;
use super::database_runner::DatabaseMigrationRunner;
use super::document_runner::{DocumentMigrationRunner, RunSummary, RunnerConfig, DEFAULT_BATCH_SIZE};
use super::error::MigrationError;
use super::locator::CollectionLocator;
use super::registry::MigrationRegistry;
use super::service::{DocumentVersionService, DEFAULT_VERSION_FIELD};
use crate::store::{SledStore, StoreClient, StoreConfig};
use crate::version::Version;

/// Configuration surface consumed by the startup runners.
///
/// The connection is described by explicit optional fields with a fixed
/// precedence: a pre-built `client` wins over `store` settings, which win
/// over a bare `path`. Leaving all three unset is a configuration error
/// raised at runner construction.
#[derive(Clone, Default)]
pub struct MigrationSettings {
    /// Pre-built store client.
    pub client: Option<Arc<dyn StoreClient>>,
    /// Settings to open a [`SledStore`] from.
    pub store: Option<StoreConfig>,
    /// Path to open a [`SledStore`] at with default settings.
    pub path: Option<String>,
    /// Global default database name.
    pub database: Option<String>,
    /// Explicit per-type target versions.
    pub targets: BTreeMap<String, Version>,
    /// Reserved version field name; `None` uses [`DEFAULT_VERSION_FIELD`].
    pub version_field: Option<String>,
    /// Cursor batch size; `None` uses the runner default.
    pub batch_size: Option<usize>,
}

impl MigrationSettings {
    /// Empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-built client (highest precedence).
    pub fn with_client(mut self, client: Arc<dyn StoreClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Open a sled store from explicit settings.
    pub fn with_store(mut self, config: StoreConfig) -> Self {
        self.store = Some(config);
        self
    }

    /// Open a sled store at a path (lowest precedence).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the global default database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Pin a document type to an explicit target version.
    pub fn with_target(mut self, document_type: impl Into<String>, version: Version) -> Self {
        self.targets.insert(document_type.into(), version);
        self
    }

    /// Override the reserved version field name.
    pub fn with_version_field(mut self, field: impl Into<String>) -> Self {
        self.version_field = Some(field.into());
        self
    }

    /// Override the cursor batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    fn resolve_client(&self) -> Result<Arc<dyn StoreClient>, MigrationError> {
        if let Some(client) = &self.client {
            return Ok(Arc::clone(client));
        }
        if let Some(config) = &self.store {
            return Ok(Arc::new(SledStore::open(config.clone())?));
        }
        if let Some(path) = &self.path {
            return Ok(Arc::new(SledStore::open(StoreConfig::new(path))?));
        }
        Err(MigrationError::NoClient)
    }

    fn version_field(&self) -> String {
        self.version_field
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION_FIELD.to_string())
    }
}

/// Startup orchestrator for document migrations.
pub struct StartUpDocumentMigrationRunner {
    client: Arc<dyn StoreClient>,
    runner: DocumentMigrationRunner,
}

impl StartUpDocumentMigrationRunner {
    /// Resolve the connection and validate that every located type resolves
    /// to a database name.
    pub fn new(
        settings: MigrationSettings,
        locator: CollectionLocator,
        registry: Arc<MigrationRegistry>,
    ) -> Result<Self, MigrationError> {
        let client = settings.resolve_client()?;

        for (document_type, location) in locator.locations() {
            if location.database_or(settings.database.as_deref()).is_none() {
                return Err(MigrationError::NoDatabaseName {
                    scope: document_type.to_string(),
                });
            }
        }

        let service = Arc::new(DocumentVersionService::new(
            Arc::clone(&registry),
            settings.targets.clone(),
            settings.version_field(),
        ));
        let config = RunnerConfig {
            batch_size: settings.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            default_database: settings.database.clone(),
        };
        let runner = DocumentMigrationRunner::new(registry, service, locator, config);

        Ok(Self { client, runner })
    }

    /// Migrate every stale document in every located collection.
    pub fn run_all(&self) -> Result<RunSummary, MigrationError> {
        self.run_all_with(&CancelToken::default())
    }

    /// `run_all` with an external cancellation token.
    pub fn run_all_with(&self, cancel: &CancelToken) -> Result<RunSummary, MigrationError> {
        self.runner.run_all(self.client.as_ref(), cancel)
    }
}

/// Startup orchestrator for database-level migrations.
pub struct StartUpDatabaseMigrationRunner {
    client: Arc<dyn StoreClient>,
    database_name: String,
    runner: DatabaseMigrationRunner,
}

impl StartUpDatabaseMigrationRunner {
    /// Resolve the connection and target database eagerly.
    ///
    /// The first located type's explicit database wins over the global
    /// default; with neither, construction fails.
    pub fn new(
        settings: MigrationSettings,
        locator: CollectionLocator,
        registry: Arc<MigrationRegistry>,
    ) -> Result<Self, MigrationError> {
        let client = settings.resolve_client()?;

        let explicit = locator
            .locations()
            .next()
            .and_then(|(_, location)| location.database_or(None));
        let database_name = explicit
            .or_else(|| settings.database.as_deref().filter(|name| !name.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| MigrationError::NoDatabaseName {
                scope: "database migrations".to_string(),
            })?;

        Ok(Self {
            client,
            database_name,
            runner: DatabaseMigrationRunner::new(registry),
        })
    }

    /// Run the database-level chain once against the resolved database.
    pub fn run_all(&self) -> Result<(), MigrationError> {
        let handle = self.client.database(&self.database_name)?;
        self.runner.run(handle.as_ref())
    }
}
