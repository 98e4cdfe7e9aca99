//! Schema-less document model.
//!
//! A document is an opaque JSON object identified by its `_id` field and
//! carrying a reserved version field whose name is a single global
//! configuration value.

use std::fmt;

use serde_json::Value;

use crate::error::Error;
use crate::version::Version;

/// Name of the primary key field.
pub const ID_FIELD: &str = "_id";

/// An opaque, schema-less record.
pub type Document = serde_json::Map<String, Value>;

/// Primary key of a document, encoded canonically for use as a store key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Build an id from the raw `_id` value.
    pub fn from_value(value: &Value) -> Self {
        DocumentId(value.to_string())
    }

    /// Canonical byte encoding, used as the store key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read a document's primary key.
pub fn document_id(document: &Document) -> Result<DocumentId, Error> {
    document
        .get(ID_FIELD)
        .map(DocumentId::from_value)
        .ok_or(Error::MissingId)
}

/// Read the version stored in a document.
///
/// An absent field is `Ok(None)`; callers treat it as [`Version::ZERO`]. A
/// present field that is not a parseable version string is an error.
pub fn stored_version(document: &Document, field: &str) -> Result<Option<Version>, Error> {
    match document.get(field) {
        None => Ok(None),
        Some(Value::String(text)) => match text.parse() {
            Ok(version) => Ok(Some(version)),
            Err(_) => Err(Error::InvalidVersionField {
                field: field.to_string(),
                value: text.clone(),
            }),
        },
        Some(other) => Err(Error::InvalidVersionField {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Stamp a version into a document, overwriting any previous value.
pub fn stamp_version(document: &mut Document, field: &str, version: Version) {
    document.insert(field.to_string(), Value::String(version.to_string()));
}
