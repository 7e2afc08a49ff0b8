//! # Store Editing Subcommands
//!
//! Row-level edits on an account file, mirroring the editor's actions:
//!
//! - `acct add <store> --kind local --login alice --password ...`
//! - `acct remove <store> <index>`
//! - `acct list <store>`
//! - `acct save-valid <store> <out>` writes only the rows without errors.
//! - `acct types` lists the selectable account kinds.
//!
//! Edits do not validate; run `acct validate` to see what the editor would
//! flag.

use std::path::PathBuf;

use acct_core::{format_labels, parse_labels, Account, AccountStore, AccountTypeRegistry};
use anyhow::{bail, Result};
use clap::Args;

use crate::storage::{filter_valid_accounts, load_accounts, save_accounts};
use crate::validate::{engine_config, load_schema, validate_accounts};

/// Arguments for `acct add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Account file to append to. Created if missing.
    pub store: PathBuf,

    /// Account type tag (see `acct types`).
    #[arg(long)]
    pub kind: String,

    /// Login name.
    #[arg(long, default_value = "")]
    pub login: String,

    /// Password, for kinds that store one.
    #[arg(long)]
    pub password: Option<String>,

    /// Labels separated by `;`.
    #[arg(long)]
    pub labels: Option<String>,
}

/// Arguments for `acct remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Account file to edit.
    pub store: PathBuf,

    /// Zero-based row index.
    pub index: usize,
}

/// Arguments for `acct list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Account file to print.
    pub store: PathBuf,
}

/// Arguments for `acct save-valid`.
#[derive(Args, Debug)]
pub struct SaveValidArgs {
    /// Account file to read.
    pub store: PathBuf,

    /// Destination for the valid rows. Removed if no row is valid.
    pub out: PathBuf,

    /// JSON Schema document to validate against instead of the built-in
    /// account rules.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Build the row `acct add` appends.
pub fn new_account(
    registry: &AccountTypeRegistry,
    kind: &str,
    login: &str,
    password: Option<&str>,
    labels: Option<&str>,
) -> Result<Account> {
    let kind = registry.require(kind)?.clone();
    let password = match (kind.requires_password, password) {
        (true, password) => Some(password.unwrap_or_default().to_string()),
        (false, Some(_)) => {
            tracing::warn!(kind = %kind.kind, "account kind does not store a password, ignoring it");
            None
        }
        (false, None) => None,
    };
    Ok(Account {
        label: Some(parse_labels(labels)),
        type_record: kind,
        login: login.to_string(),
        password,
    })
}

/// Execute `acct add`.
pub fn run_add(args: &AddArgs) -> Result<u8> {
    let store = AccountStore::new(load_accounts(&args.store)?);
    let account = new_account(
        &AccountTypeRegistry::builtin(),
        &args.kind,
        &args.login,
        args.password.as_deref(),
        args.labels.as_deref(),
    )?;
    let index = store.add(account);
    save_accounts(&args.store, &store.snapshot())?;
    println!("OK: added row {index} to {}", args.store.display());
    Ok(0)
}

/// Execute `acct remove`.
pub fn run_remove(args: &RemoveArgs) -> Result<u8> {
    let store = AccountStore::new(load_accounts(&args.store)?);
    let len = store.len();
    let Some(removed) = store.remove(args.index) else {
        bail!("row {} out of range ({len} rows)", args.index);
    };
    let written = save_accounts(&args.store, &store.snapshot())?;
    println!("OK: removed row {} ({})", args.index, removed.login);
    if !written {
        println!("{} is now empty and was removed", args.store.display());
    }
    Ok(0)
}

/// Execute `acct list`.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let accounts = load_accounts(&args.store)?;
    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(0);
    }
    println!("Accounts ({}):", accounts.len());
    for (index, account) in accounts.iter().enumerate() {
        println!("{}", describe(index, account));
    }
    Ok(0)
}

fn describe(index: usize, account: &Account) -> String {
    let kind = if account.type_record.is_unset() {
        "-"
    } else {
        account.type_record.name.as_str()
    };
    let labels = format_labels(account.label.as_deref().unwrap_or_default());
    if labels.is_empty() {
        format!("  {index}: [{kind}] {}", account.login)
    } else {
        format!("  {index}: [{kind}] {}  ({labels})", account.login)
    }
}

/// Execute `acct save-valid`.
pub fn run_save_valid(args: &SaveValidArgs) -> Result<u8> {
    let accounts = load_accounts(&args.store)?;
    let schema = load_schema(args.schema.as_deref())?;
    let config = engine_config(false)?;
    let errors = crate::block_on(validate_accounts(accounts.clone(), schema, config))??;

    let valid = filter_valid_accounts(&accounts, &errors);
    let skipped = accounts.len() - valid.len();
    if save_accounts(&args.out, &valid)? {
        println!(
            "OK: saved {} rows to {} ({skipped} invalid skipped)",
            valid.len(),
            args.out.display()
        );
    } else {
        println!("No valid rows; {} removed", args.out.display());
    }
    Ok(0)
}

/// Execute `acct types`.
pub fn run_types() -> Result<u8> {
    let registry = AccountTypeRegistry::builtin();
    println!("Account types ({}):", registry.kinds().len());
    for kind in registry.kinds() {
        let password = if kind.requires_password { "yes" } else { "no" };
        println!("  {}: {} (password: {password})", kind.kind, kind.name);
    }
    Ok(0)
}
