//! # Engine Configuration
//!
//! | Variable                 | Values            | Default   |
//! |--------------------------|-------------------|-----------|
//! | `ACCT_VALIDATION_MODE`   | `lazy`, `eager`   | `lazy`    |
//! | `ACCT_UNLOCATED_ISSUES`  | `surface`, `drop` | `surface` |
//!
//! Values are case-insensitive. Unknown values are an error rather than a
//! silent fallback.

use std::str::FromStr;

use thiserror::Error;

use crate::error_index::UnlocatedIssues;

/// When automatic re-validation starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActivationMode {
    /// Armed by the first failing pass.
    #[default]
    Lazy,
    /// Armed at construction.
    Eager,
}

impl FromStr for ActivationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(ConfigError::InvalidValue {
                key: MODE_VAR,
                value: other.to_string(),
                expected: "lazy|eager",
            }),
        }
    }
}

impl FromStr for UnlocatedIssues {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(Self::Surface),
            "drop" => Ok(Self::Drop),
            other => Err(ConfigError::InvalidValue {
                key: UNLOCATED_VAR,
                value: other.to_string(),
                expected: "surface|drop",
            }),
        }
    }
}

const MODE_VAR: &str = "ACCT_VALIDATION_MODE";
const UNLOCATED_VAR: &str = "ACCT_UNLOCATED_ISSUES";

/// Error loading engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value outside its allowed set.
    #[error("{key}: invalid value '{value}' (expected {expected})")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// Validation engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// When automatic re-validation is armed.
    pub mode: ActivationMode,
    /// Handling of issues that do not address a cell.
    pub unlocated: UnlocatedIssues,
}

impl EngineConfig {
    /// Lazy engine with the default unlocated-issue policy.
    pub fn lazy() -> Self {
        Self::default()
    }

    /// Eager engine with the default unlocated-issue policy.
    pub fn eager() -> Self {
        Self {
            mode: ActivationMode::Eager,
            ..Self::default()
        }
    }

    /// Same settings with a different unlocated-issue policy.
    pub fn with_unlocated(mut self, unlocated: UnlocatedIssues) -> Self {
        self.unlocated = unlocated;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ACCT_VALIDATION_MODE` (default: `lazy`)
    /// - `ACCT_UNLOCATED_ISSUES` (default: `surface`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = match lookup(MODE_VAR) {
            Some(v) => v.parse()?,
            None => ActivationMode::default(),
        };
        let unlocated = match lookup(UNLOCATED_VAR) {
            Some(v) => v.parse()?,
            None => UnlocatedIssues::default(),
        };
        Ok(Self { mode, unlocated })
    }
}
