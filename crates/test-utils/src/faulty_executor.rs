use anyhow::anyhow;
use lazydag::errors::LazydagError;
use lazydag::exec::{BatchExecutor, BatchFuture, Completion};
use lazydag::task::{Task, TaskId, TaskValue};

/// How a [`FaultyExecutor`] breaks the executor contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Report an extra outcome for an id that was never dispatched, ahead
    /// of the real ones.
    InventId,
    /// Report the first task a second time, as a failure.
    ReportTwice,
    /// Leave out the first task's outcome.
    DropFirst,
    /// Fail the whole batch without running anything.
    RejectBatch,
}

/// An executor wrapper that:
/// - delegates the real work to `inner`
/// - then corrupts the reported completions according to `fault`.
pub struct FaultyExecutor<E> {
    inner: E,
    fault: Fault,
}

impl<E> FaultyExecutor<E> {
    pub fn new(inner: E, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

impl<V: TaskValue, E: BatchExecutor<V>> BatchExecutor<V> for FaultyExecutor<E> {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V> {
        let fault = self.fault;
        if fault == Fault::RejectBatch {
            return Box::pin(async move {
                drop(batch);
                Err::<Vec<Completion<V>>, _>(LazydagError::Other(anyhow!("executor unavailable")))
            });
        }

        let run = self.inner.execute_batch(batch);
        Box::pin(async move {
            let mut completions = run.await?;
            match fault {
                Fault::InventId => {
                    let ghost = Completion::new(TaskId::new(), "ghost", Err(anyhow!("never dispatched")));
                    completions.insert(0, ghost);
                }
                Fault::ReportTwice => {
                    if let Some(first) = completions.first() {
                        let again = Completion::new(first.task, first.label.clone(), Err(anyhow!("reported again")));
                        completions.push(again);
                    }
                }
                Fault::DropFirst => {
                    if !completions.is_empty() {
                        completions.remove(0);
                    }
                }
                Fault::RejectBatch => {}
            }
            Ok(completions)
        })
    }
}
