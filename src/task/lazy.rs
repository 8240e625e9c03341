// src/task/lazy.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::task::{Arg, Args, Task, TaskFn, TaskValue};

/// A function wrapped so that calling it builds a [`Task`] instead of
/// running the body.
///
/// Cloning is cheap; all clones share the same body.
pub struct LazyFn<V> {
    label: Arc<str>,
    func: TaskFn<V>,
}

impl<V: TaskValue> LazyFn<V> {
    /// Wrap `func`, labelling its tasks with the function's type name.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Args<V>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        Self::named(short_type_name::<F>(), func)
    }

    /// Wrap `func` with an explicit label used in logs and failure reports.
    pub fn named<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(Args<V>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label.into()),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Build a task with positional arguments only.
    pub fn call(&self, args: impl IntoIterator<Item = Arg<V>>) -> Task<V> {
        self.call_with(args, std::iter::empty::<(String, Arg<V>)>())
    }

    /// Build a task with positional and keyword arguments.
    pub fn call_with<K>(
        &self,
        args: impl IntoIterator<Item = Arg<V>>,
        kwargs: impl IntoIterator<Item = (K, Arg<V>)>,
    ) -> Task<V>
    where
        K: Into<String>,
    {
        let kwargs: BTreeMap<String, Arg<V>> = kwargs
            .into_iter()
            .map(|(name, arg)| (name.into(), arg))
            .collect();

        Task::new(
            Arc::clone(&self.func),
            args.into_iter().collect(),
            kwargs,
            [],
        )
        .with_label(self.label.as_ref())
    }
}

impl<V: TaskValue> Task<V> {
    /// Turn `func` into a [`LazyFn`] that returns tasks instead of values.
    pub fn wrap<F>(func: F) -> LazyFn<V>
    where
        F: Fn(Args<V>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        LazyFn::new(func)
    }
}

impl<V> Clone for LazyFn<V> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            func: Arc::clone(&self.func),
        }
    }
}

impl<V> fmt::Debug for LazyFn<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFn")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Last path segment of a type name, e.g. `my_crate::math::add` -> `add`.
fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
