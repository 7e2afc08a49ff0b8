//! # Account Files
//!
//! Reading and writing account collections on disk.
//!
//! Files ending in `.yaml`/`.yml` are YAML, everything else is JSON. The
//! writer always produces a `{ saved_at, accounts }` envelope; the reader
//! also accepts a bare list of rows so hand-written fixtures stay short.
//!
//! A file that does not exist reads as an empty collection. Saving an empty
//! collection removes the file instead of writing an empty envelope.

use std::path::{Path, PathBuf};

use acct_core::Account;
use acct_validation::ErrorIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reading or writing an account file.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file could not be written or removed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file content is not an account collection.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The collection could not be encoded.
    #[error("failed to encode accounts: {0}")]
    Encode(String),
}

/// On-disk envelope written by [`save_accounts`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAccounts {
    /// When the file was written.
    pub saved_at: DateTime<Utc>,
    /// The saved rows, in order.
    pub accounts: Vec<Account>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountFile {
    Envelope(SavedAccounts),
    List(Vec<Account>),
}

impl AccountFile {
    fn into_accounts(self) -> Vec<Account> {
        match self {
            Self::Envelope(saved) => saved.accounts,
            Self::List(accounts) => accounts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Format::Yaml
        }
        _ => Format::Json,
    }
}

/// Load the accounts stored at `path`.
///
/// Returns an empty collection if the file does not exist.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "account file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let parse_error = |reason: String| StorageError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    let file: AccountFile = match format_of(path) {
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
    };
    let accounts = file.into_accounts();
    tracing::debug!(path = %path.display(), rows = accounts.len(), "accounts loaded");
    Ok(accounts)
}

/// Write `accounts` to `path` inside a timestamped envelope.
///
/// An empty collection removes the file instead. Returns whether a file was
/// written.
pub fn save_accounts(path: &Path, accounts: &[Account]) -> Result<bool, StorageError> {
    let write_error = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    if accounts.is_empty() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "no accounts to save, file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_error(e)),
        }
        return Ok(false);
    }

    let envelope = SavedAccounts {
        saved_at: Utc::now(),
        accounts: accounts.to_vec(),
    };
    let content = match format_of(path) {
        Format::Json => serde_json::to_string_pretty(&envelope)
            .map_err(|e| StorageError::Encode(e.to_string()))?,
        Format::Yaml => {
            serde_yaml::to_string(&envelope).map_err(|e| StorageError::Encode(e.to_string()))?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, content).map_err(write_error)?;
    tracing::info!(path = %path.display(), rows = accounts.len(), "accounts saved");
    Ok(true)
}

/// The rows of `accounts` with no issue in `errors`, in order. Rows with a
/// cell error or an issue on the row as a whole are left out.
pub fn filter_valid_accounts(accounts: &[Account], errors: &ErrorIndex) -> Vec<Account> {
    accounts
        .iter()
        .enumerate()
        .filter(|(index, _)| !errors.row_has_issues(*index))
        .map(|(_, account)| account.clone())
        .collect()
}
