// src/task/args.rs

//! Argument slots and resolved call arguments.

use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::task::{Task, TaskId};

/// A single argument slot of a task.
///
/// Either a literal value, or a placeholder for the result of another task
/// that is filled in by [`Task::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<V> {
    Value(V),
    Pending(TaskId),
}

impl<V> Arg<V> {
    /// Literal argument.
    pub fn value(v: V) -> Self {
        Arg::Value(v)
    }

    /// Placeholder for the result of `task`.
    pub fn pending(task: TaskId) -> Self {
        Arg::Pending(task)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Arg::Pending(_))
    }
}

impl<V> From<TaskId> for Arg<V> {
    fn from(id: TaskId) -> Self {
        Arg::Pending(id)
    }
}

impl<V> From<&Task<V>> for Arg<V> {
    fn from(task: &Task<V>) -> Self {
        Arg::Pending(task.id())
    }
}

/// Where a prerequisite's result is written when the task is resolved.
///
/// A prerequisite with no slots at all is an ordering-only dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Positional(usize),
    Keyword(String),
}

/// Fully resolved arguments handed to a task body.
#[derive(Debug, Clone, PartialEq)]
pub struct Args<V> {
    positional: Vec<V>,
    keyword: BTreeMap<String, V>,
}

impl<V> Args<V> {
    pub fn new(positional: Vec<V>, keyword: BTreeMap<String, V>) -> Self {
        Self {
            positional,
            keyword,
        }
    }

    /// Positional argument `index`, or an error naming the missing slot.
    pub fn get(&self, index: usize) -> anyhow::Result<&V> {
        self.positional.get(index).ok_or_else(|| {
            anyhow!(
                "missing positional argument {} (got {})",
                index,
                self.positional.len()
            )
        })
    }

    /// Keyword argument `name`, if it was passed.
    pub fn kwarg(&self, name: &str) -> Option<&V> {
        self.keyword.get(name)
    }

    pub fn positional(&self) -> &[V] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, V> {
        &self.keyword
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    pub fn into_parts(self) -> (Vec<V>, BTreeMap<String, V>) {
        (self.positional, self.keyword)
    }
}
