//! # Error Types
//!
//! Top-level error type for the account editor. Crate-specific errors
//! (schema construction, engine faults, storage) live next to the code that
//! raises them and convert into [`AcctError`] at crate boundaries.

use thiserror::Error;

/// Top-level error type for the account editor.
#[derive(Error, Debug)]
pub enum AcctError {
    /// A row index was outside the current collection.
    #[error("row index {index} out of range (collection has {len} rows)")]
    RowOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length at the time of the request.
        len: usize,
    },

    /// No account kind is registered under the given type tag.
    #[error("unknown account type '{0}'")]
    UnknownAccountType(String),

    /// An account kind with the same type tag is already registered.
    #[error("account type '{0}' is already registered")]
    DuplicateAccountType(String),

    /// Schema validation failure surfaced outside the engine.
    #[error("schema validation error: {0}")]
    SchemaValidation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
