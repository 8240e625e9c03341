// src/exec/mod.rs

//! Stage execution layer.
//!
//! The session only decides *what* may run together; this module decides
//! *how* a stage of independent tasks actually runs.
//!
//! - [`backend`] provides the `BatchExecutor` trait, the per-task
//!   [`Completion`] it reports, and `ConfiguredExecutor` selected from
//!   config.
//! - [`pool`] runs a stage concurrently on Tokio's blocking pool.
//! - [`inline`] runs a stage sequentially on the caller's thread.

pub mod backend;
pub mod inline;
pub mod pool;

pub use backend::{BatchExecutor, BatchFuture, Completion, ConfiguredExecutor};
pub use inline::InlineExecutor;
pub use pool::PoolExecutor;
