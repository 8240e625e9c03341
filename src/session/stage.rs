// src/session/stage.rs

use crate::task::{Task, TaskId};

/// A group of mutually independent tasks that run concurrently once every
/// earlier stage has finished.
#[derive(Debug)]
pub(crate) struct Stage<V> {
    /// Position within the plan that produced it.
    index: usize,
    tasks: Vec<Task<V>>,
}

impl<V> Stage<V> {
    pub(crate) fn new(index: usize, tasks: Vec<Task<V>>) -> Self {
        Self { index, tasks }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id()).collect()
    }

    pub(crate) fn into_tasks(self) -> Vec<Task<V>> {
        self.tasks
    }
}
