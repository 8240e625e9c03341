// src/exec/pool.rs

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::task::{Task, TaskId, TaskValue};

use super::backend::{BatchExecutor, BatchFuture, Completion};

/// Runs every task of a batch on Tokio's blocking thread pool and waits
/// for all of them.
///
/// Task bodies are ordinary synchronous functions, so they go through
/// `spawn_blocking` rather than the async worker threads. With a
/// `max_concurrency` limit, a semaphore permit is held for the duration of
/// each body; dispatch waits for a free permit.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct PoolExecutor {
    limit: Option<Arc<Semaphore>>,
    max_concurrency: Option<usize>,
}

impl PoolExecutor {
    /// Unbounded: every task of a stage is dispatched at once.
    pub fn new() -> Self {
        Self::default()
    }

    /// At most `max` task bodies run at the same time (minimum 1).
    pub fn with_max_concurrency(max: usize) -> Self {
        let max = max.max(1);
        Self {
            limit: Some(Arc::new(Semaphore::new(max))),
            max_concurrency: Some(max),
        }
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }
}

impl<V: TaskValue> BatchExecutor<V> for PoolExecutor {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V> {
        // Clone the limit so the future doesn't borrow `self` across `await`.
        let limit = self.limit.clone();
        let max_concurrency = self.max_concurrency;

        Box::pin(async move {
            debug!(tasks = batch.len(), ?max_concurrency, "dispatching batch to blocking pool");

            let mut handles: Vec<(TaskId, String, JoinHandle<anyhow::Result<V>>)> =
                Vec::with_capacity(batch.len());

            for task in batch {
                let permit = match &limit {
                    Some(sem) => Some(Arc::clone(sem).acquire_owned().await.map_err(anyhow::Error::from)?),
                    None => None,
                };

                let id = task.id();
                let label = task.label().to_string();
                trace!(task = %id, label = %label, "spawning task body");

                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    task.invoke()
                });
                handles.push((id, label, handle));
            }

            // Barrier: every handle is awaited before the batch completes.
            let mut completions = Vec::with_capacity(handles.len());
            for (id, label, handle) in handles {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_err) if join_err.is_panic() => {
                        let payload = join_err.into_panic();
                        Err(anyhow!("task panicked: {}", super::inline::panic_message(&*payload)))
                    }
                    Err(join_err) => Err(anyhow!("task was cancelled: {join_err}")),
                };
                completions.push(Completion::new(id, label, outcome));
            }

            Ok(completions)
        })
    }
}
