//! # Account Store
//!
//! Ordered, observable collection of [`Account`] rows.
//!
//! The store owns the rows exclusively. Readers take snapshots or subscribe
//! to a `tokio::sync::watch` receiver that is notified on every mutation,
//! including in-place edits of a single field. Validation engines subscribe
//! here; they never write back.

use tokio::sync::watch;

use crate::account::Account;
use crate::error::AcctError;

/// Thread-safe, cloneable observable list of accounts.
///
/// Clones share the same underlying channel.
#[derive(Debug, Clone)]
pub struct AccountStore {
    tx: watch::Sender<Vec<Account>>,
}

impl AccountStore {
    /// Create a store holding `accounts`.
    pub fn new(accounts: Vec<Account>) -> Self {
        let (tx, _rx) = watch::channel(accounts);
        Self { tx }
    }

    /// Subscribe to changes. The receiver starts out with the current rows
    /// marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Account>> {
        self.tx.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Copy of the current rows.
    pub fn snapshot(&self) -> Vec<Account> {
        self.tx.borrow().clone()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Whether the store has no rows.
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Append a row, returning its index.
    pub fn add(&self, account: Account) -> usize {
        let mut index = 0;
        self.tx.send_modify(|rows| {
            rows.push(account);
            index = rows.len() - 1;
        });
        tracing::debug!(index, "account added");
        index
    }

    /// Remove the row at `index`. Out-of-range indices are a no-op and
    /// return `None`.
    pub fn remove(&self, index: usize) -> Option<Account> {
        let mut removed = None;
        self.tx.send_if_modified(|rows| {
            if index < rows.len() {
                removed = Some(rows.remove(index));
                true
            } else {
                false
            }
        });
        if removed.is_some() {
            tracing::debug!(index, "account removed");
        }
        removed
    }

    /// Edit the row at `index` in place.
    ///
    /// # Errors
    ///
    /// Returns [`AcctError::RowOutOfRange`] if there is no such row; nothing
    /// is notified in that case.
    pub fn update(&self, index: usize, f: impl FnOnce(&mut Account)) -> Result<(), AcctError> {
        let mut result = Ok(());
        self.tx.send_if_modified(|rows| {
            let len = rows.len();
            match rows.get_mut(index) {
                Some(row) => {
                    f(row);
                    true
                }
                None => {
                    result = Err(AcctError::RowOutOfRange { index, len });
                    false
                }
            }
        });
        result
    }

    /// Replace every row at once.
    pub fn replace(&self, accounts: Vec<Account>) -> Vec<Account> {
        self.tx.send_replace(accounts)
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
