// src/session/lookup.rs

use std::collections::HashMap;

use crate::task::TaskId;

/// Result table: completed task id -> the value it produced.
///
/// Append-only while a session runs; only [`Session::reset`] clears it.
///
/// [`Session::reset`]: crate::session::Session::reset
#[derive(Debug, Clone)]
pub struct Lookup<V> {
    values: HashMap<TaskId, V>,
}

impl<V> Lookup<V> {
    pub fn get(&self, id: &TaskId) -> Option<&V> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, &V)> {
        self.values.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.values.keys().copied()
    }

    pub(crate) fn insert(&mut self, id: TaskId, value: V) {
        self.values.insert(id, value);
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}

impl<V> Default for Lookup<V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<V> std::ops::Index<TaskId> for Lookup<V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `id` has no result.
    fn index(&self, id: TaskId) -> &V {
        match self.values.get(&id) {
            Some(v) => v,
            None => panic!("no result recorded for task {id}"),
        }
    }
}
