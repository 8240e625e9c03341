// src/errors.rs

//! Crate-wide error type and helpers.

use std::fmt;

use thiserror::Error;

use crate::task::TaskId;

#[derive(Error, Debug)]
pub enum LazydagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A planning sweep made no progress: the remaining tasks form a cycle
    /// or wait on an id that will never complete.
    #[error("Unresolvable task graph: {} task(s) can never become ready: {}", blocked.len(), join_ids(blocked))]
    UnresolvableGraph { blocked: Vec<TaskId> },

    /// A task was about to run while some prerequisite had no result yet.
    #[error("Task {task} resolved before its prerequisites completed (missing: {})", join_ids(missing))]
    PrematureInvocation { task: TaskId, missing: Vec<TaskId> },

    /// One or more task bodies failed during a stage.
    #[error("{} task(s) failed in stage {stage}: {}", failures.len(), join_failures(failures))]
    TaskBodyFailure {
        stage: usize,
        failures: Vec<TaskFailure>,
    },

    #[error("Duplicate task identity: {0}")]
    DuplicateIdentity(TaskId),

    /// The executor reported outcomes for ids it was never handed.
    #[error("Executor reported {} unknown task(s) in stage {stage}: {}", tasks.len(), join_ids(tasks))]
    UnknownCompletion { stage: usize, tasks: Vec<TaskId> },

    #[error("Previous plan not consumed: {remaining} stage(s) still queued")]
    PlanNotConsumed { remaining: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single failed task body, attributed back to its task.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: TaskId,
    pub label: String,
    pub error: anyhow::Error,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {:#}", self.label, self.task, self.error)
    }
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LazydagError>;
