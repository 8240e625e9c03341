// src/task/deferred.rs

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use crate::errors::{LazydagError, Result};
use crate::session::Lookup;
use crate::task::{Arg, Args, Slot, TaskFn, TaskId};

/// A lazily evaluated call: a function, its arguments, and the tasks whose
/// results it is still waiting for.
///
/// Arguments may be [`Arg::Pending`] placeholders; every placeholder is
/// recorded in `prereqs` together with the slot it fills. Once `prereqs`
/// is empty the task holds only literal arguments and may be invoked.
///
/// `Task` is not `Clone` and [`Task::invoke`] consumes it,
/// so it runs at most once.
pub struct Task<V> {
    id: TaskId,
    label: String,
    func: TaskFn<V>,
    args: Vec<Arg<V>>,
    kwargs: BTreeMap<String, Arg<V>>,
    /// Prerequisite id -> slots its result fills. An empty list means the
    /// prerequisite only orders execution and is not consumed.
    prereqs: HashMap<TaskId, Vec<Slot>>,
}

impl<V> Task<V> {
    /// Build a task from a function, its arguments and any extra
    /// ordering-only prerequisites.
    ///
    /// Does not register the task anywhere.
    pub fn new(
        func: TaskFn<V>,
        args: Vec<Arg<V>>,
        kwargs: BTreeMap<String, Arg<V>>,
        explicit_prereqs: impl IntoIterator<Item = TaskId>,
    ) -> Self {
        let mut prereqs: HashMap<TaskId, Vec<Slot>> = HashMap::new();

        for (index, arg) in args.iter().enumerate() {
            if let Arg::Pending(dep) = arg {
                prereqs.entry(*dep).or_default().push(Slot::Positional(index));
            }
        }

        for (name, arg) in kwargs.iter() {
            if let Arg::Pending(dep) = arg {
                prereqs
                    .entry(*dep)
                    .or_default()
                    .push(Slot::Keyword(name.clone()));
            }
        }

        for dep in explicit_prereqs {
            prereqs.entry(dep).or_default();
        }

        Self {
            id: TaskId::new(),
            label: "task".to_string(),
            func,
            args,
            kwargs,
            prereqs,
        }
    }

    /// Add an ordering-only prerequisite.
    ///
    /// No-op if `dep` is already a prerequisite through an argument.
    pub fn after(mut self, dep: impl Into<TaskId>) -> Self {
        self.prereqs.entry(dep.into()).or_default();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Placeholder argument referring to this task's eventual result.
    pub fn output(&self) -> Arg<V> {
        Arg::Pending(self.id)
    }

    /// Remaining prerequisites and the slots they fill.
    pub fn prereqs(&self) -> &HashMap<TaskId, Vec<Slot>> {
        &self.prereqs
    }

    pub fn prereq_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.prereqs.keys().copied()
    }

    /// A task with no outstanding prerequisites may be invoked.
    pub fn is_ready(&self) -> bool {
        self.prereqs.is_empty()
    }

    /// Fill every placeholder from `lookup` and clear the prerequisites.
    ///
    /// If any prerequisite has no result yet, nothing is modified and
    /// [`LazydagError::PrematureInvocation`] names the missing ids.
    pub fn resolve(&mut self, lookup: &Lookup<V>) -> Result<()>
    where
        V: Clone,
    {
        let mut missing: Vec<TaskId> = self
            .prereqs
            .keys()
            .filter(|dep| !lookup.contains(dep))
            .copied()
            .collect();

        if !missing.is_empty() {
            missing.sort();
            return Err(LazydagError::PrematureInvocation {
                task: self.id,
                missing,
            });
        }

        for (dep, slots) in std::mem::take(&mut self.prereqs) {
            let Some(value) = lookup.get(&dep) else {
                continue;
            };
            for slot in slots {
                match slot {
                    Slot::Positional(index) => {
                        if let Some(arg) = self.args.get_mut(index) {
                            *arg = Arg::Value(value.clone());
                        }
                    }
                    Slot::Keyword(name) => {
                        self.kwargs.insert(name, Arg::Value(value.clone()));
                    }
                }
            }
        }

        trace!(task = %self.id, label = %self.label, "prerequisites resolved");
        Ok(())
    }

    /// Run the task body with its resolved arguments.
    ///
    /// # Panics
    ///
    /// Panics if prerequisites are still outstanding. Callers must
    /// [`resolve`](Task::resolve) first; reaching this with unresolved
    /// prerequisites is a scheduling bug.
    pub fn invoke(self) -> anyhow::Result<V> {
        assert!(
            self.prereqs.is_empty(),
            "task {} ({}) invoked with {} unresolved prerequisite(s)",
            self.id,
            self.label,
            self.prereqs.len()
        );

        let id = self.id;
        let literal = |arg: Arg<V>| match arg {
            Arg::Value(v) => v,
            Arg::Pending(dep) => unreachable!("task {id} holds placeholder for {dep} with no prerequisite"),
        };

        let positional = self.args.into_iter().map(literal).collect();
        let keyword = self
            .kwargs
            .into_iter()
            .map(|(name, arg)| (name, literal(arg)))
            .collect();

        (self.func)(Args::new(positional, keyword))
    }
}

impl<V> From<&Task<V>> for TaskId {
    fn from(task: &Task<V>) -> Self {
        task.id
    }
}

impl<V> fmt::Debug for Task<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("args", &self.args.len())
            .field("kwargs", &self.kwargs.keys().collect::<Vec<_>>())
            .field("prereqs", &self.prereqs)
            .finish_non_exhaustive()
    }
}
