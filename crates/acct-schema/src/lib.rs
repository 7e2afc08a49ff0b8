//! # acct-schema — Schema Interface & Built-in Schemas
//!
//! A schema answers one question: does this value pass, and if not, where
//! and why not. Everything the validation engine knows about rules flows
//! through the [`Schema`] trait.
//!
//! ## Interface (`schema`)
//!
//! - [`Schema::safe_check`] — async, pure check returning
//!   [`CheckOutcome::Success`] or [`CheckOutcome::Failure`] with a
//!   non-empty list of [`Issue`](acct_core::Issue)s. An `Err` is a
//!   [`SchemaFault`]: the check itself broke, as opposed to the value being
//!   invalid.
//! - [`SchemaCell`] — swappable schema reference other components can watch.
//!
//! ## Built-in Schemas
//!
//! - [`AccountRowSchema`] (`account`) — the rules for a single account row.
//! - [`Each`] (`account`) — lifts a row schema to a whole collection,
//!   prefixing every issue with its row index.
//! - [`JsonSchema`] (`json`) — adapter over the `jsonschema` crate for rules
//!   written as JSON Schema documents.
//!
//! ## Crate Policy
//!
//! - Depends only on `acct-core` internally.
//! - Checks never mutate their input and are deterministic for equal input.

pub mod account;
pub mod json;
pub mod schema;

pub use account::{messages, AccountRowSchema, Each};
pub use json::JsonSchema;
pub use schema::{CheckOutcome, Schema, SchemaCell, SchemaError, SchemaFault, SchemaRef};
