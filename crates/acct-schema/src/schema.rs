//! # Schema Interface
//!
//! The contract every rule set satisfies. Checks are async because a rule
//! may need to consult something outside the process; most built-in checks
//! complete without suspending.

use std::fmt;
use std::sync::Arc;

use acct_core::Issue;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

/// Result of a successful schema invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The value satisfies every rule.
    Success,
    /// The value violates at least one rule.
    Failure(Vec<Issue>),
}

impl CheckOutcome {
    /// Build an outcome from a list of issues. An empty list is success.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            Self::Success
        } else {
            Self::Failure(issues)
        }
    }

    /// Whether the value passed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The reported issues (empty on success).
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Success => &[],
            Self::Failure(issues) => issues,
        }
    }

    /// Consume the outcome, returning its issues.
    pub fn into_issues(self) -> Vec<Issue> {
        match self {
            Self::Success => Vec::new(),
            Self::Failure(issues) => issues,
        }
    }
}

/// The schema check itself failed.
///
/// This is never a statement about the validated value. Callers receive it
/// as an error and decide whether to retry.
#[derive(Error, Debug, Clone)]
pub enum SchemaFault {
    /// The check could not run to completion.
    #[error("schema '{schema}' check failed: {reason}")]
    CheckFailed {
        /// Name of the schema that faulted.
        schema: String,
        /// Reason for the fault.
        reason: String,
    },

    /// A resource the check depends on is not reachable.
    #[error("schema '{schema}' unavailable: {reason}")]
    Unavailable {
        /// Name of the schema that faulted.
        schema: String,
        /// Reason the dependency is unavailable.
        reason: String,
    },
}

/// Error while constructing a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document could not be loaded or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    Load {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema document is not a valid schema.
    #[error("schema build error for '{schema_name}': {reason}")]
    Build {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be compiled.
        reason: String,
    },

    /// IO error reading a schema file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validation rule set.
///
/// Implementations must be pure: no side effects, and equal inputs give
/// equal outcomes.
#[async_trait]
pub trait Schema: Send + Sync {
    /// Short identifier used in logs and fault messages.
    fn name(&self) -> &str {
        "schema"
    }

    /// Check `value`, reporting issues instead of failing.
    async fn safe_check(&self, value: &Value) -> Result<CheckOutcome, SchemaFault>;
}

#[async_trait]
impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn safe_check(&self, value: &Value) -> Result<CheckOutcome, SchemaFault> {
        (**self).safe_check(value).await
    }
}

/// Shared, type-erased schema.
pub type SchemaRef = Arc<dyn Schema>;

/// A swappable schema reference.
///
/// Holds the current [`SchemaRef`] in a `watch` channel so that observers
/// see replacements. Clones share the same slot.
#[derive(Clone)]
pub struct SchemaCell {
    tx: watch::Sender<SchemaRef>,
}

impl SchemaCell {
    /// Create a cell holding `schema`.
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self::from_ref(Arc::new(schema))
    }

    /// Create a cell holding an existing shared schema.
    pub fn from_ref(schema: SchemaRef) -> Self {
        let (tx, _rx) = watch::channel(schema);
        Self { tx }
    }

    /// The schema currently in the cell.
    pub fn current(&self) -> SchemaRef {
        Arc::clone(&self.tx.borrow())
    }

    /// Swap in a new schema, returning the previous one. Observers are
    /// notified.
    pub fn replace(&self, schema: SchemaRef) -> SchemaRef {
        tracing::debug!(schema = schema.name(), "schema replaced");
        self.tx.send_replace(schema)
    }

    /// Subscribe to replacements.
    pub fn subscribe(&self) -> watch::Receiver<SchemaRef> {
        self.tx.subscribe()
    }
}

impl fmt::Debug for SchemaCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCell")
            .field("schema", &self.tx.borrow().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::IssuePath;

    struct AlwaysFails;

    #[async_trait]
    impl Schema for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        async fn safe_check(&self, _value: &Value) -> Result<CheckOutcome, SchemaFault> {
            Ok(CheckOutcome::Failure(vec![Issue::at_root("nope")]))
        }
    }

    struct AlwaysPasses;

    #[async_trait]
    impl Schema for AlwaysPasses {
        async fn safe_check(&self, _value: &Value) -> Result<CheckOutcome, SchemaFault> {
            Ok(CheckOutcome::Success)
        }
    }

    #[test]
    fn test_outcome_from_issues() {
        assert!(CheckOutcome::from_issues(Vec::new()).is_success());
        let outcome = CheckOutcome::from_issues(vec![Issue::new(
            IssuePath::from_pointer("/0/login"),
            "empty",
        )]);
        assert!(!outcome.is_success());
        assert_eq!(outcome.issues().len(), 1);
        assert_eq!(outcome.into_issues()[0].message, "empty");
    }

    #[tokio::test]
    async fn test_arc_schema_delegates() {
        let schema: SchemaRef = Arc::new(AlwaysFails);
        assert_eq!(schema.name(), "always-fails");
        let outcome = schema.safe_check(&Value::Null).await.unwrap();
        assert_eq!(outcome.issues()[0].message, "nope");
    }

    #[test]
    fn test_schema_cell_replace_notifies() {
        let cell = SchemaCell::new(AlwaysPasses);
        let rx = cell.subscribe();
        assert_eq!(cell.current().name(), "schema");

        let previous = cell.replace(Arc::new(AlwaysFails));
        assert_eq!(previous.name(), "schema");
        assert_eq!(cell.current().name(), "always-fails");
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_fault_display() {
        let fault = SchemaFault::Unavailable {
            schema: "remote".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "schema 'remote' unavailable: connection refused"
        );
    }
}
