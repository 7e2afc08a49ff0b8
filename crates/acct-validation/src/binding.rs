//! # Reactive Binding
//!
//! The subscription an armed engine holds. One background task watches the
//! data and schema channels together and re-runs validation on change.
//!
//! ## Coalescing
//!
//! The task awaits each pass before it looks at the channels again, so at
//! most one automatic pass is in flight. Every notification that arrives in
//! the meantime, from either channel, collapses into a single follow-up pass
//! over the latest values. A data change and a schema change that land
//! together produce one pass, not two.
//!
//! ## Change Detection
//!
//! `watch` notifies on every send, including in-place field edits. Before
//! running, the task compares the fresh JSON snapshot with the last one
//! published (schema by identity, data structurally) and skips notifications
//! that changed nothing.
//!
//! ## Lifetime
//!
//! The task only holds a weak reference to the engine. Dropping the engine
//! drops the [`Binding`], which aborts the task and releases both receivers.
//! If both channels close, the task ends on its own.

use std::sync::Weak;

use acct_schema::SchemaRef;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::engine::Inner;

/// Handle to the running watch task. Aborts the task on drop.
pub(crate) struct Binding {
    handle: JoinHandle<()>,
}

impl Binding {
    pub(crate) fn spawn<T>(
        runtime: &Handle,
        engine: Weak<Inner<T>>,
        data: watch::Receiver<T>,
        schema: watch::Receiver<SchemaRef>,
    ) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        let handle = runtime.spawn(watch_sources(engine, data, schema));
        Self { handle }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn watch_sources<T>(
    engine: Weak<Inner<T>>,
    mut data: watch::Receiver<T>,
    mut schema: watch::Receiver<SchemaRef>,
) where
    T: Serialize + Send + Sync + 'static,
{
    let mut data_open = true;
    let mut schema_open = true;

    loop {
        tokio::select! {
            changed = data.changed(), if data_open => {
                if changed.is_err() {
                    tracing::debug!("data source closed");
                    data_open = false;
                    continue;
                }
            }
            changed = schema.changed(), if schema_open => {
                if changed.is_err() {
                    tracing::debug!("schema source closed");
                    schema_open = false;
                    continue;
                }
            }
            else => break,
        }

        // Both channels are read fresh by the pass; mark everything seen.
        data.borrow_and_update();
        schema.borrow_and_update();

        let Some(engine) = engine.upgrade() else {
            break;
        };
        match engine.revalidate_if_changed().await {
            Ok(Some(index)) => {
                tracing::debug!(valid = index.is_empty(), "automatic re-validation finished");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "automatic re-validation failed");
            }
        }
    }

    tracing::debug!("validation binding stopped");
}
