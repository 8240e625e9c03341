use std::sync::{Arc, Mutex};

use lazydag::exec::{BatchExecutor, BatchFuture};
use lazydag::task::{Task, TaskId, TaskValue};

/// Shared log of dispatched batches, in dispatch order.
pub type BatchLog = Arc<Mutex<Vec<Vec<TaskId>>>>;

/// An executor wrapper that:
/// - records the ids of every batch it is handed
/// - delegates the actual work to `inner`.
pub struct RecordingExecutor<E> {
    inner: E,
    batches: BatchLog,
}

impl<E> RecordingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the batch log; stays valid after the executor is moved
    /// into a session.
    pub fn log(&self) -> BatchLog {
        Arc::clone(&self.batches)
    }
}

impl<V: TaskValue, E: BatchExecutor<V>> BatchExecutor<V> for RecordingExecutor<E> {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V> {
        {
            let mut guard = self.batches.lock().unwrap();
            guard.push(batch.iter().map(|t| t.id()).collect());
        }
        self.inner.execute_batch(batch)
    }
}

/// Index of the batch that contained `id`, if any.
pub fn batch_of(log: &BatchLog, id: TaskId) -> Option<usize> {
    log.lock()
        .unwrap()
        .iter()
        .position(|batch| batch.contains(&id))
}
