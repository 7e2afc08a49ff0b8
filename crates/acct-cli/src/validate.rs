//! # Validate Subcommand
//!
//! Runs one validation pass over an account file and reports every invalid
//! cell.
//!
//! ```bash
//! acct validate accounts.json
//! acct validate accounts.yaml --schema schemas/accounts.schema.json --json
//! ```
//!
//! Exit code 0 when the file is valid, 1 when any issue was found.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use acct_core::{Account, AccountStore};
use acct_schema::{AccountRowSchema, Each, JsonSchema, SchemaCell, SchemaRef};
use acct_validation::{EngineConfig, ErrorIndex, UnlocatedIssues, ValidationEngine};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::storage::load_accounts;

/// Arguments for the `acct validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Account file (JSON, or YAML by extension).
    pub path: PathBuf,

    /// JSON Schema document to validate against instead of the built-in
    /// account rules.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Discard issues that do not point at a cell (overrides
    /// `ACCT_UNLOCATED_ISSUES`).
    #[arg(long)]
    pub drop_unlocated: bool,
}

/// One invalid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellReport {
    /// Row index.
    pub row: usize,
    /// Field name.
    pub field: String,
    /// Message shown under the cell.
    pub message: String,
}

/// Result of validating one file.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Validated file.
    pub file: PathBuf,
    /// Name of the schema that ran.
    pub schema: String,
    /// Number of rows in the file.
    pub rows: usize,
    /// Whether the pass found no issues.
    pub valid: bool,
    /// Invalid cells, ordered by row then field.
    pub cells: Vec<CellReport>,
    /// Messages that do not belong to a cell.
    pub global: Vec<String>,
    /// Unlocated issues discarded by policy.
    pub dropped: usize,
}

impl ValidationReport {
    fn new(file: &Path, schema: &str, rows: usize, errors: &ErrorIndex) -> Self {
        Self {
            file: file.to_path_buf(),
            schema: schema.to_string(),
            rows,
            valid: errors.is_empty(),
            cells: errors
                .iter()
                .map(|(row, field, message)| CellReport {
                    row,
                    field: field.to_string(),
                    message: message.to_string(),
                })
                .collect(),
            global: errors.global().to_vec(),
            dropped: errors.dropped(),
        }
    }

    /// Human-readable rendering.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}: {} rows, schema {}\n",
            self.file.display(),
            self.rows,
            self.schema
        );
        for cell in &self.cells {
            out.push_str(&format!("  row {} {}: {}\n", cell.row, cell.field, cell.message));
        }
        for message in &self.global {
            out.push_str(&format!("  {message}\n"));
        }
        if self.dropped > 0 {
            out.push_str(&format!("  ({} unlocated issues dropped)\n", self.dropped));
        }
        if self.valid {
            out.push_str("OK: no issues found\n");
        } else {
            let issues = self.cells.len() + self.global.len() + self.dropped;
            out.push_str(&format!("FAILED: {issues} issues\n"));
        }
        out
    }
}

/// Build the schema used for validation: the JSON Schema at `path` if
/// given, otherwise the built-in account rules.
pub fn load_schema(path: Option<&Path>) -> Result<SchemaRef> {
    match path {
        Some(path) => {
            let schema = JsonSchema::from_file(path)
                .with_context(|| format!("loading schema {}", path.display()))?;
            Ok(Arc::new(schema))
        }
        None => Ok(Arc::new(Each::new(AccountRowSchema::default()))),
    }
}

/// Validate `accounts` once and return the resulting error index.
pub async fn validate_accounts(
    accounts: Vec<Account>,
    schema: SchemaRef,
    config: EngineConfig,
) -> Result<ErrorIndex> {
    let store = AccountStore::new(accounts);
    let cell = SchemaCell::from_ref(schema);
    let engine = ValidationEngine::for_store(&cell, &store, config)?;
    let errors = engine.validate().await?;
    Ok(errors)
}

/// Engine settings from the environment, with command-line overrides.
pub fn engine_config(drop_unlocated: bool) -> Result<EngineConfig> {
    let config = EngineConfig::from_env().context("reading engine configuration")?;
    Ok(if drop_unlocated {
        config.with_unlocated(UnlocatedIssues::Drop)
    } else {
        config
    })
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let accounts = load_accounts(&args.path)?;
    let rows = accounts.len();
    let schema = load_schema(args.schema.as_deref())?;
    let schema_name = schema.name().to_string();
    let config = engine_config(args.drop_unlocated)?;

    tracing::debug!(file = %args.path.display(), rows, schema = %schema_name, "validating");
    let errors = crate::block_on(validate_accounts(accounts, schema, config))??;
    let report = ValidationReport::new(&args.path, &schema_name, rows, &errors);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(if report.valid { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::{AccountKind, Issue, IssuePath, Label};
    use acct_schema::messages;

    fn valid_account() -> Account {
        Account {
            label: Some(vec![Label::new("ops")]),
            type_record: AccountKind::local(),
            login: "alice".to_string(),
            password: Some("correct-horse".to_string()),
        }
    }

    #[tokio::test]
    async fn test_builtin_schema_reports_cells() {
        let mut bad = valid_account();
        bad.login = String::new();
        bad.password = Some("short".to_string());

        let errors = validate_accounts(
            vec![valid_account(), bad],
            load_schema(None).unwrap(),
            EngineConfig::lazy(),
        )
        .await
        .unwrap();

        assert_eq!(errors.invalid_rows(), vec![1]);
        assert_eq!(errors.lookup(1, "login"), Some(messages::LOGIN_EMPTY));
        assert_eq!(errors.lookup(1, "password"), Some(messages::PASSWORD_TOO_SHORT));
    }

    #[tokio::test]
    async fn test_valid_collection_has_empty_index() {
        let errors = validate_accounts(
            vec![valid_account()],
            load_schema(None).unwrap(),
            EngineConfig::eager(),
        )
        .await
        .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_schema_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = load_schema(Some(&dir.path().join("absent.json"))) else {
            panic!("expected a load error");
        };
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn test_report_text() {
        let errors = ErrorIndex::build(
            &[
                Issue::new(IssuePath::from_pointer("/0/login"), "empty"),
                Issue::at_root("not a list"),
            ],
            UnlocatedIssues::Surface,
        );
        let report = ValidationReport::new(Path::new("a.json"), "each(account-row)", 1, &errors);
        assert!(!report.valid);

        let text = report.render_text();
        assert!(text.starts_with("a.json: 1 rows, schema each(account-row)\n"));
        assert!(text.contains("  row 0 login: empty\n"));
        assert!(text.contains("  not a list\n"));
        assert!(text.ends_with("FAILED: 2 issues\n"));
    }

    #[test]
    fn test_report_text_valid() {
        let report = ValidationReport::new(Path::new("a.json"), "s", 0, &ErrorIndex::empty());
        assert!(report.valid);
        assert!(report.render_text().ends_with("OK: no issues found\n"));
    }
}
