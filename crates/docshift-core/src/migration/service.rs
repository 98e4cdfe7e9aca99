//! Version lookups per document type.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::MigrationError;
use super::registry::MigrationRegistry;
use crate::version::Version;

/// Default name of the reserved version field.
pub const DEFAULT_VERSION_FIELD: &str = "version";

/// Derives version targets for document types.
///
/// Purely reads from the registry and static configuration; no side effects.
pub struct DocumentVersionService {
    registry: Arc<MigrationRegistry>,
    targets: BTreeMap<String, Version>,
    version_field: String,
}

impl DocumentVersionService {
    /// Create a service over a registry, explicit per-type targets, and the
    /// reserved version field name.
    pub fn new(
        registry: Arc<MigrationRegistry>,
        targets: BTreeMap<String, Version>,
        version_field: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            targets,
            version_field: version_field.into(),
        }
    }

    /// The reserved field name used across the whole store.
    pub fn version_field_name(&self) -> &str {
        &self.version_field
    }

    /// The version stamped into documents of `document_type` once migrated.
    pub fn collection_version(&self, document_type: &str) -> Result<Version, MigrationError> {
        self.configured_or_latest(document_type)
    }

    /// The target used to decide staleness: the explicitly configured version
    /// if present, else the highest version reachable via registered steps.
    pub fn current_or_latest_migration_version(
        &self,
        document_type: &str,
    ) -> Result<Version, MigrationError> {
        self.configured_or_latest(document_type)
    }

    fn configured_or_latest(&self, document_type: &str) -> Result<Version, MigrationError> {
        if let Some(version) = self.targets.get(document_type) {
            return Ok(*version);
        }
        self.registry
            .latest_document_version(document_type)
            .ok_or_else(|| MigrationError::NoVersionInformation {
                document_type: document_type.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::step::FnDocumentMigration;

    fn registry_with_order_steps() -> Arc<MigrationRegistry> {
        Arc::new(
            MigrationRegistry::builder()
                .register_document(FnDocumentMigration::new(
                    "Order",
                    Version::new(1, 0, 0),
                    |_| Ok(()),
                ))
                .unwrap()
                .register_document(FnDocumentMigration::new(
                    "Order",
                    Version::new(2, 0, 0),
                    |_| Ok(()),
                ))
                .unwrap()
                .build(),
        )
    }

    #[test]
    fn test_configured_target_wins() {
        let mut targets = BTreeMap::new();
        targets.insert("Order".to_string(), Version::new(1, 0, 0));
        let service =
            DocumentVersionService::new(registry_with_order_steps(), targets, "version");

        assert_eq!(
            service.current_or_latest_migration_version("Order").unwrap(),
            Version::new(1, 0, 0)
        );
        assert_eq!(
            service.collection_version("Order").unwrap(),
            Version::new(1, 0, 0)
        );
    }

    #[test]
    fn test_falls_back_to_latest_registered_step() {
        let service =
            DocumentVersionService::new(registry_with_order_steps(), BTreeMap::new(), "version");

        assert_eq!(
            service.current_or_latest_migration_version("Order").unwrap(),
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn test_unknown_type_is_configuration_error() {
        let service =
            DocumentVersionService::new(registry_with_order_steps(), BTreeMap::new(), "version");

        assert!(matches!(
            service.current_or_latest_migration_version("User"),
            Err(MigrationError::NoVersionInformation { .. })
        ));
    }

    #[test]
    fn test_version_field_name() {
        let service = DocumentVersionService::new(
            registry_with_order_steps(),
            BTreeMap::new(),
            DEFAULT_VERSION_FIELD,
        );
        assert_eq!(service.version_field_name(), "version");
    }
}
