//! Store-level error types.

use thiserror::Error;

/// Errors raised by the document store.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Document has no `_id` field, so it cannot be replaced by primary key.
    #[error("document has no _id field")]
    MissingId,

    /// The reserved version field holds a value that is not a version string.
    #[error("invalid version field '{field}': {value}")]
    InvalidVersionField {
        /// Name of the version field.
        field: String,
        /// The offending value, rendered as JSON.
        value: String,
    },
}
