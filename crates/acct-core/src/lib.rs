//! # acct-core — Foundational Types for the Account Editor
//!
//! Every other crate in the workspace depends on `acct-core`; it depends on
//! nothing internal.
//!
//! ## Contents
//!
//! 1. **Records.** [`Account`] is one editable row: labels, an account kind,
//!    a login and an optional password. Deserialization is lenient so that
//!    half-filled rows survive loading and are judged by a schema instead of
//!    by the parser.
//!
//! 2. **Account kinds.** [`AccountTypeRegistry`] holds the kinds a row may
//!    select (`LDAP` and `Локальная` by default). Kinds are registered at
//!    runtime; no process-wide singleton.
//!
//! 3. **Issues.** [`Issue`] is the concrete, tagged shape of one validation
//!    failure: an [`IssuePath`] of index/key segments plus a message.
//!
//! 4. **Store.** [`AccountStore`] is the ordered, observable collection that
//!    the validation engine watches. Every mutation notifies subscribers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `acct-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod error;
pub mod issue;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use account::{
    format_labels, parse_labels, Account, AccountKind, AccountTypeRegistry, Label,
};
pub use error::AcctError;
pub use issue::{Issue, IssuePath, PathSegment};
pub use store::AccountStore;
