//! # acct-cli — Command-Line Front End for the Account Editor
//!
//! Provides the `acct` binary. Each subcommand lives in its own module and
//! exposes a `run_*` function returning the process exit code.
//!
//! ## Subcommands
//!
//! - `acct validate` — validate an account file, report invalid cells.
//! - `acct add` / `acct remove` / `acct list` — row-level edits.
//! - `acct save-valid` — persist only the rows without errors.
//! - `acct types` — list the selectable account kinds.
//!
//! ## Configuration
//!
//! Engine settings come from `ACCT_VALIDATION_MODE` and
//! `ACCT_UNLOCATED_ISSUES`; command-line flags override them.

pub mod edit;
pub mod storage;
pub mod validate;

use std::future::Future;

use anyhow::{Context, Result};

/// Run `future` to completion on a fresh single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    Ok(runtime.block_on(future))
}
