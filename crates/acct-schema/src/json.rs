//! # JSON Schema Adapter
//!
//! Runs rules written as JSON Schema (Draft 2020-12) through the
//! `jsonschema` crate and translates each error into an [`Issue`].
//!
//! ## Path Translation
//!
//! `jsonschema` reports locations as JSON Pointers into the instance. Those
//! are parsed into [`IssuePath`] segments against the instance, so a digit
//! object key stays a key. A `required` error points at the
//! object that is missing the property, so the missing property's name is
//! appended: a row without `login` is reported at `/<row>/login`, the cell
//! the user has to fill in.
//!
//! ## Messages
//!
//! Error messages come from `jsonschema` unless a field override is
//! registered with [`JsonSchema::with_field_message`], in which case every
//! issue whose cell field matches gets the override.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use acct_core::{Issue, IssuePath};
use async_trait::async_trait;
use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::Value;

use crate::schema::{CheckOutcome, Schema, SchemaError, SchemaFault};

/// A schema backed by a compiled JSON Schema document.
///
/// `Send + Sync`; the compiled validator is reused for every check.
pub struct JsonSchema {
    name: String,
    validator: Validator,
    field_messages: HashMap<String, String>,
}

impl JsonSchema {
    /// Compile `schema` under the given name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Build`] if the document is not a valid schema.
    pub fn new(name: impl Into<String>, schema: &Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts.build(schema).map_err(|e| SchemaError::Build {
            schema_name: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name,
            validator,
            field_messages: HashMap::new(),
        })
    }

    /// Load and compile a schema file. The file name becomes the schema name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the file cannot be read or is not
    /// JSON, and [`SchemaError::Build`] if it is not a valid schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("schema")
            .to_string();

        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            schema_name: name.clone(),
            reason: format!("cannot read file: {e}"),
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Load {
            schema_name: name.clone(),
            reason: format!("invalid JSON: {e}"),
        })?;

        Self::new(name, &value)
    }

    /// Report every issue on `field` with `message` instead of the
    /// validator's own wording.
    pub fn with_field_message(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_messages.insert(field.into(), message.into());
        self
    }

    /// Run the validator synchronously and collect issues.
    pub fn issues(&self, instance: &Value) -> Vec<Issue> {
        self.validator
            .iter_errors(instance)
            .map(|e| {
                let mut path = IssuePath::from_pointer_in(&e.instance_path.to_string(), instance);
                if let ValidationErrorKind::Required { property } = &e.kind {
                    if let Some(property) = property.as_str() {
                        path = path.child(property);
                    }
                }
                let message = self.message_for(&path).unwrap_or_else(|| e.to_string());
                Issue::new(path, message)
            })
            .collect()
    }

    fn message_for(&self, path: &IssuePath) -> Option<String> {
        let field = match path.cell() {
            Some((_, field)) => field,
            None => path.segments().last()?.as_key()?,
        };
        self.field_messages.get(field).cloned()
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("name", &self.name)
            .field("field_messages", &self.field_messages)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for JsonSchema {
    fn name(&self) -> &str {
        &self.name
    }

    async fn safe_check(&self, value: &Value) -> Result<CheckOutcome, SchemaFault> {
        Ok(CheckOutcome::from_issues(self.issues(value)))
    }
}
