//! # Validation Engine
//!
//! One engine per `(schema, data source)` pair. The engine reads both through
//! `watch` receivers, never writes to them, and publishes its own
//! [`ValidationState`] on a `watch` channel of its own.
//!
//! ## States
//!
//! `UNARMED → ARMED`
//!
//! - Lazy engines arm on the first pass that reports an issue.
//! - Eager engines arm at construction.
//! - Nothing disarms an engine. Dropping it releases the subscription.
//!
//! ## A Pass
//!
//! 1. Take a generation number.
//! 2. Snapshot the schema reference and the data (serialized to JSON) once.
//! 3. Run the schema check on the snapshot.
//! 4. Build a fresh [`ErrorIndex`] from the outcome.
//! 5. If no newer pass has started, publish `{ is_valid, errors }` in one
//!    step and arm on failure. Otherwise drop the result.
//!
//! Arming needs a Tokio runtime. A failing pass polled outside one is still
//! published; the engine stays unarmed until a later failing pass runs
//! inside a runtime.
//!
//! The previous index is never merged into the new one, so an error that a
//! pass no longer reproduces disappears with that pass.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use acct_core::{Account, AccountStore};
use acct_schema::{CheckOutcome, SchemaCell, SchemaRef};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::binding::Binding;
use crate::config::{ActivationMode, EngineConfig};
use crate::error::EngineError;
use crate::error_index::ErrorIndex;

/// Published result of the most recent completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationState {
    /// `true` until a pass reports an issue; always equal to
    /// `errors.is_empty()`.
    pub is_valid: bool,
    /// Error index of the most recent published pass.
    pub errors: ErrorIndex,
    /// Whether automatic re-validation is active.
    pub armed: bool,
    /// Number of passes published so far.
    pub completed_passes: u64,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: ErrorIndex::empty(),
            armed: false,
            completed_passes: 0,
        }
    }
}

/// The schema and data a pass ran against.
pub(crate) struct Snapshot {
    schema: SchemaRef,
    data: Value,
}

impl Snapshot {
    /// Structural equality on the data, identity on the schema.
    fn same_as(&self, other: &Snapshot) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.schema) as *const (),
            Arc::as_ptr(&other.schema) as *const (),
        ) && self.data == other.data
    }
}

pub(crate) struct Inner<T> {
    data: watch::Receiver<T>,
    schema: watch::Receiver<SchemaRef>,
    state: watch::Sender<ValidationState>,
    config: EngineConfig,
    generation: AtomicU64,
    publish: Mutex<()>,
    last_validated: Mutex<Option<Snapshot>>,
    binding: Mutex<Option<Binding>>,
}

impl<T> Inner<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn snapshot(&self) -> Result<Snapshot, EngineError> {
        let schema = Arc::clone(&self.schema.borrow());
        let data = serde_json::to_value(&*self.data.borrow())?;
        Ok(Snapshot { schema, data })
    }

    async fn run_pass(self: &Arc<Self>, snapshot: Snapshot) -> Result<ErrorIndex, EngineError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, schema = snapshot.schema.name(), "validation pass started");

        let outcome = snapshot.schema.safe_check(&snapshot.data).await?;
        let index = match outcome {
            CheckOutcome::Success => ErrorIndex::empty(),
            CheckOutcome::Failure(issues) => ErrorIndex::build(&issues, self.config.unlocated),
        };
        let failed = !index.is_empty();

        let _guard = self.publish.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "validation pass superseded, result discarded");
            return Ok(index);
        }

        let armed = if failed {
            match self.ensure_armed() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "failing pass published, automatic re-validation not armed");
                    false
                }
            }
        } else {
            self.binding.lock().is_some()
        };
        *self.last_validated.lock() = Some(snapshot);
        self.state.send_modify(|state| {
            state.is_valid = !failed;
            state.errors = index.clone();
            state.armed = armed;
            state.completed_passes += 1;
        });
        tracing::debug!(
            generation,
            valid = !failed,
            cells = index.cell_count(),
            global = index.global().len(),
            "validation pass published"
        );
        Ok(index)
    }

    /// Re-run validation unless the current snapshot matches the last one
    /// published. Returns `None` when skipped.
    pub(crate) async fn revalidate_if_changed(
        self: &Arc<Self>,
    ) -> Result<Option<ErrorIndex>, EngineError> {
        let snapshot = self.snapshot()?;
        let unchanged = self
            .last_validated
            .lock()
            .as_ref()
            .is_some_and(|last| last.same_as(&snapshot));
        if unchanged {
            tracing::trace!("change notification without structural change, skipped");
            return Ok(None);
        }
        self.run_pass(snapshot).await.map(Some)
    }

    /// Start the binding if it is not running yet. Idempotent.
    fn ensure_armed(self: &Arc<Self>) -> Result<(), EngineError> {
        let mut binding = self.binding.lock();
        if binding.is_some() {
            return Ok(());
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| EngineError::RuntimeUnavailable)?;
        *binding = Some(Binding::spawn(
            &runtime,
            Arc::downgrade(self),
            self.data.clone(),
            self.schema.clone(),
        ));
        tracing::info!(mode = ?self.config.mode, "automatic re-validation armed");
        Ok(())
    }
}

/// Validates a watched data source against a watched schema reference.
pub struct ValidationEngine<T> {
    inner: Arc<Inner<T>>,
}

impl<T> ValidationEngine<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Create an engine over the given schema and data receivers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuntimeUnavailable`] if the engine is eager
    /// and no Tokio runtime is running. Lazy engines can be built anywhere.
    pub fn new(
        schema: watch::Receiver<SchemaRef>,
        data: watch::Receiver<T>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let (state, _rx) = watch::channel(ValidationState::default());
        let inner = Arc::new(Inner {
            data,
            schema,
            state,
            config,
            generation: AtomicU64::new(0),
            publish: Mutex::new(()),
            last_validated: Mutex::new(None),
            binding: Mutex::new(None),
        });

        if config.mode == ActivationMode::Eager {
            inner.ensure_armed()?;
            inner.state.send_modify(|state| state.armed = true);
        }

        Ok(Self { inner })
    }

    /// Create an engine whose schema never changes.
    pub fn with_schema(
        schema: SchemaRef,
        data: watch::Receiver<T>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let (_tx, rx) = watch::channel(schema);
        Self::new(rx, data, config)
    }

    /// Run one validation pass over the current schema and data.
    ///
    /// Resolves to the index this pass built. If a newer pass started while
    /// this one was running, the index is returned but not published.
    ///
    /// # Errors
    ///
    /// Propagates schema faults and snapshot failures. Published state is
    /// left as it was.
    pub async fn validate(&self) -> Result<ErrorIndex, EngineError> {
        let snapshot = self.inner.snapshot()?;
        self.inner.run_pass(snapshot).await
    }

    /// Message for the cell at `(row, field)`, if the last published pass
    /// reported one.
    pub fn get_error(&self, row: usize, field: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .errors
            .lookup(row, field)
            .map(str::to_string)
    }

    /// Reset to "valid, no errors" without running the schema. Does not
    /// disarm.
    pub fn clear_errors(&self) {
        let _guard = self.inner.publish.lock();
        *self.inner.last_validated.lock() = None;
        self.inner.state.send_modify(|state| {
            state.errors.clear();
            state.is_valid = true;
        });
    }

    /// Whether the last published pass found no issues.
    pub fn is_valid(&self) -> bool {
        self.inner.state.borrow().is_valid
    }

    /// Error index of the last published pass.
    pub fn errors(&self) -> ErrorIndex {
        self.inner.state.borrow().errors.clone()
    }

    /// Whether automatic re-validation is active.
    pub fn is_armed(&self) -> bool {
        self.inner.state.borrow().armed
    }

    /// Copy of the full published state.
    pub fn state(&self) -> ValidationState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to published state changes.
    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.inner.state.subscribe()
    }

    /// The settings this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }
}

impl ValidationEngine<Vec<Account>> {
    /// Create an engine over an account store and a schema cell.
    pub fn for_store(
        schema: &SchemaCell,
        store: &AccountStore,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        Self::new(schema.subscribe(), store.subscribe(), config)
    }
}

impl<T> fmt::Debug for ValidationEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}
