// src/exec/inline.rs

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use tracing::trace;

use crate::task::{Task, TaskValue};

use super::backend::{BatchExecutor, BatchFuture, Completion};

/// Runs a batch sequentially on the calling thread.
///
/// Useful as a deterministic stand-in for the pool in tests, and for
/// workloads where task bodies are too cheap to be worth a thread hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl<V: TaskValue> BatchExecutor<V> for InlineExecutor {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V> {
        Box::pin(async move {
            let completions = batch.into_iter().map(run_inline).collect();
            Ok(completions)
        })
    }
}

fn run_inline<V: TaskValue>(task: Task<V>) -> Completion<V> {
    let id = task.id();
    let label = task.label().to_string();
    trace!(task = %id, label = %label, "running task inline");

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.invoke())) {
        Ok(outcome) => outcome,
        Err(payload) => Err(anyhow!("task panicked: {}", panic_message(&*payload))),
    };

    Completion::new(id, label, outcome)
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
