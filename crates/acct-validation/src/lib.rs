//! # acct-validation — Reactive Validation Engine
//!
//! Validates an observable collection of rows against a swappable schema and
//! publishes the result in a form a table UI can query cell by cell.
//!
//! ## Components
//!
//! - **Error Index** (`error_index.rs`): `(row, field) -> message` lookup
//!   built from a flat list of issues. Rebuilt from scratch on every pass.
//!
//! - **Validation Engine** (`engine.rs`): runs the schema against a snapshot
//!   of the data, publishes `{ is_valid, errors, armed }`, and arms automatic
//!   re-validation. States: `Unarmed → Armed`; there is no way back short of
//!   dropping the engine.
//!
//! - **Reactive Binding** (`binding.rs`): the task that, once armed, watches
//!   the data and schema channels and re-runs validation. At most one
//!   automatic pass is in flight; changes that arrive during a pass are
//!   coalesced into a single follow-up pass.
//!
//! - **Configuration** (`config.rs`): activation mode (lazy/eager) and the
//!   policy for issues that do not address a cell.
//!
//! ## Guarantees
//!
//! - After `validate()` resolves, `is_valid == errors.is_empty()`.
//! - The published state always comes from one completed pass over one
//!   snapshot. A pass that finishes after a newer pass started is discarded.
//! - Schema faults propagate to the caller of `validate()`; they never turn
//!   into issues.

mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod error_index;

pub use config::{ActivationMode, ConfigError, EngineConfig};
pub use engine::{ValidationEngine, ValidationState};
pub use error::EngineError;
pub use error_index::{ErrorIndex, UnlocatedIssues};
