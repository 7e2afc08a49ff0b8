//! Cross-checks the built-in account rules against the JSON Schema shipped
//! in `schemas/accounts.schema.json`: both must agree on which cells of a
//! collection are invalid.

use std::collections::BTreeSet;
use std::path::PathBuf;

use acct_core::{Account, AccountKind, Label};
use acct_schema::{messages, AccountRowSchema, Each, JsonSchema, Schema};
use serde_json::{json, Value};

/// Find the repository root by walking up from this crate.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/acct-schema -> repo root
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn json_schema() -> JsonSchema {
    JsonSchema::from_file(repo_root().join("schemas/accounts.schema.json")).unwrap()
}

async fn invalid_cells(schema: &dyn Schema, value: &Value) -> BTreeSet<(usize, String)> {
    schema
        .safe_check(value)
        .await
        .unwrap()
        .issues()
        .iter()
        .filter_map(|i| i.path.cell().map(|(row, field)| (row, field.to_string())))
        .collect()
}

fn mixed_collection() -> Value {
    let rows = vec![
        Account {
            label: Some(vec![Label::new("ops")]),
            type_record: AccountKind::ldap(),
            login: "admin".to_string(),
            password: None,
        },
        Account {
            label: Some(vec![Label::new("")]),
            type_record: AccountKind::local(),
            login: String::new(),
            password: Some("short".to_string()),
        },
        Account::blank(),
    ];
    serde_json::to_value(rows).unwrap()
}

#[tokio::test]
async fn test_shipped_schema_compiles() {
    let schema = json_schema();
    assert_eq!(schema.name(), "accounts.schema.json");
}

#[tokio::test]
async fn test_builtin_and_json_schema_agree_on_invalid_cells() {
    let value = mixed_collection();
    let builtin = Each::new(AccountRowSchema::default());
    let json = json_schema();

    let from_builtin = invalid_cells(&builtin, &value).await;
    let from_json = invalid_cells(&json, &value).await;

    let expected: BTreeSet<(usize, String)> = [
        (1, "label"),
        (1, "login"),
        (1, "password"),
        (2, "typeRecord"),
        (2, "login"),
        (2, "password"),
    ]
    .into_iter()
    .map(|(r, f)| (r, f.to_string()))
    .collect();

    assert_eq!(from_builtin, expected);
    assert_eq!(from_json, expected);
}

#[tokio::test]
async fn test_valid_collection_passes_both() {
    let value = json!([
        {
            "label": null,
            "typeRecord": { "name": "LDAP", "type": "ldap", "requiresPassword": false },
            "login": "admin",
            "password": null
        },
        {
            "label": [{ "text": "db" }],
            "typeRecord": { "name": "Локальная", "type": "local", "requiresPassword": true },
            "login": "postgres",
            "password": "longenough1"
        }
    ]);
    let builtin = Each::new(AccountRowSchema::default());
    assert!(builtin.safe_check(&value).await.unwrap().is_success());
    assert!(json_schema().safe_check(&value).await.unwrap().is_success());
}

#[tokio::test]
async fn test_builtin_messages_for_blank_row() {
    let value = json!([{ "login": "", "password": "short", "typeRecord": {} }]);
    let outcome = Each::new(AccountRowSchema::default())
        .safe_check(&value)
        .await
        .unwrap();
    let login = outcome
        .issues()
        .iter()
        .find(|i| i.path.cell() == Some((0, "login")))
        .unwrap();
    assert_eq!(login.message, messages::LOGIN_EMPTY);
}
