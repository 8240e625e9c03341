// src/task/mod.rs

//! Deferred, identity-bearing units of work.
//!
//! - [`id`] holds the process-unique [`TaskId`].
//! - [`args`] defines argument slots ([`Arg`]), where a prerequisite result
//!   lands ([`Slot`]) and the resolved call arguments ([`Args`]).
//! - [`deferred`] contains [`Task`] itself: construction, prerequisite
//!   resolution and invocation.
//! - [`lazy`] provides [`LazyFn`], which turns a function into a factory of
//!   tasks instead of calling it directly.

use std::sync::Arc;

pub mod args;
pub mod deferred;
pub mod id;
pub mod lazy;

pub use args::{Arg, Args, Slot};
pub use deferred::Task;
pub use id::TaskId;
pub use lazy::LazyFn;

/// Values that can flow between tasks.
///
/// Results are cloned out of the lookup table into dependent tasks'
/// arguments and moved across threads by the executor.
pub trait TaskValue: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> TaskValue for T {}

/// Shared, type-erased task body.
pub type TaskFn<V> = Arc<dyn Fn(Args<V>) -> anyhow::Result<V> + Send + Sync>;
