//! # Account Row Rules
//!
//! [`AccountRowSchema`] checks a single account row. [`Each`] turns any row
//! schema into a collection schema.
//!
//! ## Rules
//!
//! | Field        | Rule                                                    | Reported at          |
//! |--------------|---------------------------------------------------------|----------------------|
//! | `label`      | null/absent, or a list of `{ text }` with non-empty text | `label/<i>/text`     |
//! | `typeRecord` | object whose `name` + `type` is a registered kind        | `typeRecord`         |
//! | `login`      | non-empty string, at most 100 characters                 | `login`              |
//! | `password`   | null/absent, or a string of 8..=100 characters           | `password`           |
//!
//! Lengths count Unicode scalar values, not bytes.

use acct_core::{AccountTypeRegistry, Issue, IssuePath};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::schema::{CheckOutcome, Schema, SchemaFault};

/// User-facing messages reported by the account rules.
pub mod messages {
    /// A label with empty text.
    pub const LABEL_EMPTY: &str = "Метка не может быть пустой";
    /// `label` present but not a list.
    pub const LABEL_NOT_LIST: &str = "Ожидался список меток";
    /// No valid account kind selected.
    pub const KIND_REQUIRED: &str = "Выберите одно из значений";
    /// Empty login.
    pub const LOGIN_EMPTY: &str = "Логин не может быть пустым";
    /// Login over the length limit.
    pub const LOGIN_TOO_LONG: &str = "Логин не может быть больше 100 символов";
    /// Password under the length limit.
    pub const PASSWORD_TOO_SHORT: &str = "Пароль не может быть меньше 8 символов";
    /// Password over the length limit.
    pub const PASSWORD_TOO_LONG: &str = "Пароль не может быть больше 100 символов";
    /// A field that must be a string is something else.
    pub const EXPECTED_STRING: &str = "Ожидалась строка";
    /// A row that is not an object.
    pub const ROW_NOT_OBJECT: &str = "Ожидалась запись";
    /// A collection that is not a list.
    pub const COLLECTION_NOT_LIST: &str = "Ожидался список записей";
}

const LOGIN_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;

/// Rules for one account row.
#[derive(Debug, Clone, Default)]
pub struct AccountRowSchema {
    registry: AccountTypeRegistry,
}

impl AccountRowSchema {
    /// Row rules accepting the kinds in `registry`.
    pub fn new(registry: AccountTypeRegistry) -> Self {
        Self { registry }
    }

    /// The kinds this schema accepts.
    pub fn registry(&self) -> &AccountTypeRegistry {
        &self.registry
    }

    /// Check a row, returning issues with paths relative to the row.
    pub fn check_row(&self, row: &Value) -> Vec<Issue> {
        let Some(fields) = row.as_object() else {
            return vec![Issue::at_root(messages::ROW_NOT_OBJECT)];
        };

        let mut issues = Vec::new();
        self.check_labels(fields, &mut issues);
        self.check_kind(fields, &mut issues);
        check_login(fields, &mut issues);
        check_password(fields, &mut issues);
        issues
    }

    fn check_labels(&self, fields: &Map<String, Value>, issues: &mut Vec<Issue>) {
        let base = IssuePath::root().child("label");
        match fields.get("label") {
            None | Some(Value::Null) => {}
            Some(Value::Array(labels)) => {
                for (i, label) in labels.iter().enumerate() {
                    let text = label.get("text").and_then(Value::as_str).unwrap_or("");
                    if text.is_empty() {
                        issues.push(Issue::new(
                            base.child(i).child("text"),
                            messages::LABEL_EMPTY,
                        ));
                    }
                }
            }
            Some(_) => issues.push(Issue::new(base, messages::LABEL_NOT_LIST)),
        }
    }

    fn check_kind(&self, fields: &Map<String, Value>, issues: &mut Vec<Issue>) {
        let selected = fields.get("typeRecord").and_then(Value::as_object).and_then(|kind| {
            let name = kind.get("name")?.as_str()?;
            let tag = kind.get("type")?.as_str()?;
            Some((name, tag))
        });
        let accepted = selected.is_some_and(|(name, tag)| self.registry.accepts(name, tag));
        if !accepted {
            issues.push(Issue::new(
                IssuePath::root().child("typeRecord"),
                messages::KIND_REQUIRED,
            ));
        }
    }
}

fn check_login(fields: &Map<String, Value>, issues: &mut Vec<Issue>) {
    let path = IssuePath::root().child("login");
    match fields.get("login") {
        Some(Value::String(login)) => {
            let len = login.chars().count();
            if len == 0 {
                issues.push(Issue::new(path, messages::LOGIN_EMPTY));
            } else if len > LOGIN_MAX {
                issues.push(Issue::new(path, messages::LOGIN_TOO_LONG));
            }
        }
        None | Some(Value::Null) => issues.push(Issue::new(path, messages::LOGIN_EMPTY)),
        Some(_) => issues.push(Issue::new(path, messages::EXPECTED_STRING)),
    }
}

fn check_password(fields: &Map<String, Value>, issues: &mut Vec<Issue>) {
    let path = IssuePath::root().child("password");
    match fields.get("password") {
        None | Some(Value::Null) => {}
        Some(Value::String(password)) => {
            let len = password.chars().count();
            if len < PASSWORD_MIN {
                issues.push(Issue::new(path, messages::PASSWORD_TOO_SHORT));
            } else if len > PASSWORD_MAX {
                issues.push(Issue::new(path, messages::PASSWORD_TOO_LONG));
            }
        }
        Some(_) => issues.push(Issue::new(path, messages::EXPECTED_STRING)),
    }
}

#[async_trait]
impl Schema for AccountRowSchema {
    fn name(&self) -> &str {
        "account-row"
    }

    async fn safe_check(&self, value: &Value) -> Result<CheckOutcome, SchemaFault> {
        Ok(CheckOutcome::from_issues(self.check_row(value)))
    }
}

/// Applies a row schema to every element of a list.
///
/// A value that is not a list yields a single root issue. Row issues are
/// reported with the row index prepended to their path, in row order.
#[derive(Debug, Clone)]
pub struct Each<S> {
    row: S,
    name: String,
}

impl<S: Schema> Each<S> {
    /// Wrap a row schema.
    pub fn new(row: S) -> Self {
        let name = format!("each({})", row.name());
        Self { row, name }
    }

    /// The wrapped row schema.
    pub fn row(&self) -> &S {
        &self.row
    }
}

#[async_trait]
impl<S: Schema> Schema for Each<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn safe_check(&self, value: &Value) -> Result<CheckOutcome, SchemaFault> {
        let Some(rows) = value.as_array() else {
            return Ok(CheckOutcome::Failure(vec![Issue::at_root(
                messages::COLLECTION_NOT_LIST,
            )]));
        };

        let mut issues = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let outcome = self.row.safe_check(row).await?;
            issues.extend(
                outcome
                    .into_issues()
                    .into_iter()
                    .map(|issue| Issue::new(issue.path.prefixed(index), issue.message)),
            );
        }
        Ok(CheckOutcome::from_issues(issues))
    }
}
