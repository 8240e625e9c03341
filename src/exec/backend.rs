// src/exec/backend.rs

//! Pluggable batch executor abstraction.
//!
//! The session hands each planned stage to a `BatchExecutor` instead of
//! running tasks itself. This keeps the concurrency mechanism swappable:
//!
//! - [`PoolExecutor`](super::PoolExecutor) runs every task of a stage on
//!   Tokio's blocking pool (production default).
//! - [`InlineExecutor`](super::InlineExecutor) runs them one after another
//!   on the caller's thread, which makes tests deterministic.
//! - Tests can provide their own implementation, e.g. one that records
//!   which batches were dispatched.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::task::{Task, TaskId, TaskValue};

use super::{InlineExecutor, PoolExecutor};

/// Outcome of one dispatched task, attributed to its originating id.
#[derive(Debug)]
pub struct Completion<V> {
    pub task: TaskId,
    pub label: String,
    pub outcome: anyhow::Result<V>,
}

impl<V> Completion<V> {
    pub fn new(task: TaskId, label: impl Into<String>, outcome: anyhow::Result<V>) -> Self {
        Self {
            task,
            label: label.into(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Boxed future returned by [`BatchExecutor::execute_batch`].
pub type BatchFuture<'a, V> = Pin<Box<dyn Future<Output = Result<Vec<Completion<V>>>> + Send + 'a>>;

/// Trait abstracting how one stage of resolved tasks is executed.
///
/// Every task handed in is ready (no outstanding prerequisites) and
/// independent of the others in the batch. The returned future resolves
/// once *all* tasks have finished, with one [`Completion`] per task.
///
/// A failing task body is reported in its `Completion`; an `Err` from the
/// future itself means the executor could not run the batch at all.
pub trait BatchExecutor<V: TaskValue>: Send {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V>;
}

/// Executor selected at startup from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredExecutor {
    Pool(PoolExecutor),
    Inline(InlineExecutor),
}

impl<V: TaskValue> BatchExecutor<V> for ConfiguredExecutor {
    fn execute_batch(&mut self, batch: Vec<Task<V>>) -> BatchFuture<'_, V> {
        match self {
            ConfiguredExecutor::Pool(pool) => pool.execute_batch(batch),
            ConfiguredExecutor::Inline(inline) => inline.execute_batch(batch),
        }
    }
}
