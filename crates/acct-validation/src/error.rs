//! Engine faults. Reported issues are data, not errors; only failures of
//! the validation machinery itself end up here.

use acct_schema::SchemaFault;
use thiserror::Error;

/// A validation pass could not complete.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The schema check itself failed.
    #[error("schema fault: {0}")]
    Schema(#[from] SchemaFault),

    /// The data source could not be turned into a JSON snapshot.
    #[error("cannot snapshot data source: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Automatic re-validation needs a Tokio runtime and none is running.
    #[error("automatic re-validation requires a running Tokio runtime")]
    RuntimeUnavailable,
}

impl From<EngineError> for acct_core::AcctError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Snapshot(inner) => Self::Serialization(inner),
            other => Self::SchemaValidation(other.to_string()),
        }
    }
}
