//! # Account Records
//!
//! One [`Account`] is one row of the editor. Rows carry no identity beyond
//! their position in the enclosing collection.
//!
//! ## Wire Shape
//!
//! ```json
//! {
//!   "label": [{ "text": "admin" }],
//!   "typeRecord": { "name": "LDAP", "type": "ldap", "requiresPassword": false },
//!   "login": "root",
//!   "password": null
//! }
//! ```
//!
//! Every field defaults when absent. A freshly added row is deliberately
//! invalid (empty login, no kind selected) and it is the schema's job to say
//! so, not the deserializer's.

use serde::{Deserialize, Serialize};

use crate::error::AcctError;

/// A free-form tag attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label text. Must be non-empty to pass the account schema.
    #[serde(default)]
    pub text: String,
}

impl Label {
    /// Create a label from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The kind of an account (directory-backed or local).
///
/// Serialized as the `typeRecord` object of a row. An empty kind
/// (`AccountKind::default()`) means "nothing selected yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKind {
    /// Human-readable name shown in the selector.
    #[serde(default)]
    pub name: String,
    /// Stable type tag (`"ldap"`, `"local"`).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Whether accounts of this kind carry their own password.
    #[serde(default)]
    pub requires_password: bool,
}

impl AccountKind {
    /// Directory-backed account; credentials live in LDAP.
    pub fn ldap() -> Self {
        Self {
            name: "LDAP".to_string(),
            kind: "ldap".to_string(),
            requires_password: false,
        }
    }

    /// Local account with its own password.
    pub fn local() -> Self {
        Self {
            name: "Локальная".to_string(),
            kind: "local".to_string(),
            requires_password: true,
        }
    }

    /// Whether no kind has been selected.
    pub fn is_unset(&self) -> bool {
        self.name.is_empty() && self.kind.is_empty()
    }
}

/// One editable row of account data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Optional labels. `None` and an empty list are both accepted.
    #[serde(default)]
    pub label: Option<Vec<Label>>,
    /// Selected account kind.
    #[serde(default)]
    pub type_record: AccountKind,
    /// Login name.
    #[serde(default)]
    pub login: String,
    /// Password; `None` for kinds that do not store one.
    #[serde(default)]
    pub password: Option<String>,
}

impl Account {
    /// A blank row as created by the "add" action: no labels, no kind,
    /// empty login and empty password.
    pub fn blank() -> Self {
        Self {
            label: Some(Vec::new()),
            type_record: AccountKind::default(),
            login: String::new(),
            password: Some(String::new()),
        }
    }

    /// A blank row pre-set to the given kind. Kinds that do not require a
    /// password get `None` instead of an empty string.
    pub fn blank_of(kind: AccountKind) -> Self {
        let password = kind.requires_password.then(String::new);
        Self {
            label: Some(Vec::new()),
            type_record: kind,
            login: String::new(),
            password,
        }
    }
}

/// Registry of selectable account kinds.
///
/// Owned by whoever builds the schema; there is no global instance. New
/// kinds extend the selector without touching existing code.
#[derive(Debug, Clone)]
pub struct AccountTypeRegistry {
    kinds: Vec<AccountKind>,
}

impl AccountTypeRegistry {
    /// Registry with the built-in `ldap` and `local` kinds.
    pub fn builtin() -> Self {
        Self {
            kinds: vec![AccountKind::ldap(), AccountKind::local()],
        }
    }

    /// Registry with no kinds at all.
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    /// All registered kinds in registration order.
    pub fn kinds(&self) -> &[AccountKind] {
        &self.kinds
    }

    /// Look up a kind by its type tag.
    pub fn get(&self, kind: &str) -> Option<&AccountKind> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    /// Look up a kind by its type tag, failing with
    /// [`AcctError::UnknownAccountType`] when absent.
    pub fn require(&self, kind: &str) -> Result<&AccountKind, AcctError> {
        self.get(kind)
            .ok_or_else(|| AcctError::UnknownAccountType(kind.to_string()))
    }

    /// Register a new kind.
    ///
    /// # Errors
    ///
    /// Returns [`AcctError::DuplicateAccountType`] if the type tag is taken.
    pub fn register(&mut self, kind: AccountKind) -> Result<(), AcctError> {
        if self.get(&kind.kind).is_some() {
            return Err(AcctError::DuplicateAccountType(kind.kind));
        }
        self.kinds.push(kind);
        Ok(())
    }

    /// Whether `name` and `kind` together name a registered kind.
    pub fn accepts(&self, name: &str, kind: &str) -> bool {
        self.kinds.iter().any(|k| k.name == name && k.kind == kind)
    }
}

impl Default for AccountTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Split a `;`-separated label string into labels.
///
/// Pieces are trimmed. Empty input yields no labels; empty pieces between
/// separators are kept (they fail the schema, which is where the user sees
/// them).
pub fn parse_labels(input: Option<&str>) -> Vec<Label> {
    match input {
        None | Some("") => Vec::new(),
        Some(s) => s.split(';').map(|p| Label::new(p.trim())).collect(),
    }
}

/// Join labels back into the `"a; b"` form used by the editor's text field.
pub fn format_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
