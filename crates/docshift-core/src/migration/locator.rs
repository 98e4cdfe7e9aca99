//! Maps document types to the (database, collection) pair they live in.
//!
//! Locations are registered explicitly at startup through the builder; the
//! engine depends only on the resulting mapping.

use std::collections::BTreeMap;

use super::error::MigrationError;

/// Where documents of one type are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLocation {
    /// Explicit database override; `None` (or empty) falls back to the
    /// globally configured default.
    pub database: Option<String>,
    /// Collection name.
    pub collection: String,
}

impl CollectionLocation {
    /// A location in the default database.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            database: None,
            collection: collection.into(),
        }
    }

    /// A location with an explicit database name.
    pub fn in_database(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            collection: collection.into(),
        }
    }

    /// The explicit database name if set and non-empty, else `default`.
    pub fn database_or<'a>(&'a self, default: Option<&'a str>) -> Option<&'a str> {
        self.database
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| default.filter(|name| !name.is_empty()))
    }
}

/// Builder collecting `(type, location)` pairs at startup.
#[derive(Debug, Default)]
pub struct CollectionLocatorBuilder {
    locations: BTreeMap<String, CollectionLocation>,
}

impl CollectionLocatorBuilder {
    /// Register a location for a document type.
    pub fn location(
        mut self,
        document_type: impl Into<String>,
        location: CollectionLocation,
    ) -> Result<Self, MigrationError> {
        let document_type = document_type.into();
        if self.locations.contains_key(&document_type) {
            return Err(MigrationError::DuplicateLocation { document_type });
        }
        self.locations.insert(document_type, location);
        Ok(self)
    }

    /// Finish registration.
    pub fn build(self) -> CollectionLocator {
        CollectionLocator {
            locations: self.locations,
        }
    }
}

/// Resolved type-to-collection mapping with deterministic iteration order.
///
/// An empty locator is a legitimate state; callers must handle it explicitly.
#[derive(Debug, Clone, Default)]
pub struct CollectionLocator {
    locations: BTreeMap<String, CollectionLocation>,
}

impl CollectionLocator {
    /// Start registering locations.
    pub fn builder() -> CollectionLocatorBuilder {
        CollectionLocatorBuilder::default()
    }

    /// Ordered `(type, location)` pairs, stable across calls.
    pub fn locations(&self) -> impl Iterator<Item = (&str, &CollectionLocation)> {
        self.locations
            .iter()
            .map(|(document_type, location)| (document_type.as_str(), location))
    }

    /// Whether any locations were registered.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
