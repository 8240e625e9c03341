// src/session/mod.rs

//! Session: owns the pending tasks, the stage plan and the result table.
//!
//! - [`planner`] is the pure sweep that groups pending tasks into stages.
//! - [`stage`] holds a planned group of tasks.
//! - [`lookup`] is the read-only result table exposed to callers.
//!
//! A session is driven in three steps: tasks are [`add`](Session::add)ed
//! (or created through a [`BoundFn`]), [`plan`](Session::plan) orders them
//! into stages, and [`run`](Session::run) executes the stages one barrier
//! at a time through the injected [`BatchExecutor`]. `run` plans on its own
//! when nothing is planned yet, so calling `plan` is only needed to inspect
//! the stages first.
//!
//! The lookup table survives across runs: tasks added after a run may
//! depend on tasks that completed in it.

pub mod lookup;
pub mod planner;
pub(crate) mod stage;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::errors::{LazydagError, Result, TaskFailure};
use crate::exec::BatchExecutor;
use crate::task::{Arg, Args, LazyFn, Task, TaskId, TaskValue};

pub use lookup::Lookup;
pub use planner::{plan_stages, StagePlan};
use stage::Stage;

/// Session-level options.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Report stage progress at `info` level (otherwise `debug`).
    pub verbose: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { verbose: true }
    }
}

/// What a call to [`Session::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of stages executed.
    pub stages: usize,
    /// Number of tasks that completed successfully.
    pub tasks: usize,
    pub elapsed: Duration,
}

/// Owns the lobby (registered, not yet planned tasks), the planned stages
/// and the lookup table, plus the executor that runs each stage.
///
/// Every task id lives in exactly one of: the lobby, a planned stage, or
/// the lookup table. Session methods take `&mut self`; sharing a session
/// between threads requires external serialisation.
pub struct Session<V, E> {
    lobby: HashMap<TaskId, Task<V>>,
    stages: VecDeque<Stage<V>>,
    /// Ids of every task in `stages`.
    planned: HashSet<TaskId>,
    lookup: Lookup<V>,
    executor: E,
    options: SessionOptions,
}

impl<V, E> fmt::Debug for Session<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("lobby", &self.lobby.len())
            .field("stages", &self.stages.len())
            .field("lookup", &self.lookup.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<V: TaskValue, E: BatchExecutor<V>> Session<V, E> {
    pub fn new(executor: E) -> Self {
        Self::with_options(executor, SessionOptions::default())
    }

    pub fn with_options(executor: E, options: SessionOptions) -> Self {
        Self {
            lobby: HashMap::new(),
            stages: VecDeque::new(),
            planned: HashSet::new(),
            lookup: Lookup::default(),
            executor,
            options,
        }
    }

    /// Register a task in the lobby and return its id.
    ///
    /// Adding a task that is already in the lobby is a no-op. A task whose
    /// id is already planned or completed is rejected with
    /// [`LazydagError::DuplicateIdentity`].
    pub fn add(&mut self, task: Task<V>) -> Result<TaskId> {
        let id = task.id();

        if self.lobby.contains_key(&id) {
            debug!(task = %id, "task already in lobby; ignoring");
            return Ok(id);
        }

        if self.lookup.contains(&id) || self.planned.contains(&id) {
            return Err(LazydagError::DuplicateIdentity(id));
        }

        debug!(task = %id, label = %task.label(), prereqs = task.prereqs().len(), "task added to lobby");
        self.lobby.insert(id, task);
        Ok(id)
    }

    /// Session-bound variant of `lazy`: each call also registers the task.
    pub fn bind(&mut self, lazy: &LazyFn<V>) -> BoundFn<'_, V, E> {
        BoundFn {
            session: self,
            lazy: lazy.clone(),
        }
    }

    /// Wrap `func` and bind it to this session in one step.
    pub fn wrap<F>(&mut self, func: F) -> BoundFn<'_, V, E>
    where
        F: Fn(Args<V>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        BoundFn {
            session: self,
            lazy: LazyFn::new(func),
        }
    }

    /// Move every lobby task into ordered stages.
    ///
    /// Returns the number of stages planned. Fails with
    /// [`LazydagError::PlanNotConsumed`] if an earlier plan has not been
    /// run yet, and with [`LazydagError::UnresolvableGraph`] if some tasks
    /// can never become ready; in both cases the lobby is left unchanged.
    pub fn plan(&mut self) -> Result<usize> {
        if !self.stages.is_empty() {
            return Err(LazydagError::PlanNotConsumed {
                remaining: self.stages.len(),
            });
        }

        let pending: HashMap<TaskId, Vec<TaskId>> = self
            .lobby
            .iter()
            .map(|(id, task)| (*id, task.prereq_ids().collect()))
            .collect();

        let plan = plan_stages(&pending, |id| self.lookup.contains(id))?;

        for (index, ids) in plan.into_iter().enumerate() {
            let tasks: Vec<Task<V>> = ids.iter().filter_map(|id| self.lobby.remove(id)).collect();
            self.planned.extend(tasks.iter().map(|t| t.id()));
            self.stages.push_back(Stage::new(index, tasks));
        }

        debug!(stages = self.stages.len(), "session planned");
        Ok(self.stages.len())
    }

    /// Task ids of each planned, not yet executed stage, in execution order.
    pub fn planned_stages(&self) -> Vec<Vec<TaskId>> {
        self.stages.iter().map(|s| s.ids()).collect()
    }

    /// Execute all planned stages, planning first when needed, until both
    /// the lobby and the plan are empty.
    ///
    /// Stage N+1 is only resolved and dispatched after every task of stage
    /// N has returned and its results are merged into the lookup table.
    ///
    /// If any task body in a stage fails, the rest of that stage still
    /// finishes and its successes are recorded; then the run stops with
    /// [`LazydagError::TaskBodyFailure`] listing every failure of the stage.
    /// Stages that did not run are returned to the lobby.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        self.report(format_args!(
            "serving tasks (lobby: {}, planned stages: {})",
            self.lobby.len(),
            self.stages.len()
        ));

        loop {
            if self.stages.is_empty() {
                if self.lobby.is_empty() {
                    break;
                }
                self.plan()?;
            }

            let Some(stage) = self.stages.pop_front() else {
                break;
            };

            summary.tasks += self.serve_stage(stage).await?;
            summary.stages += 1;
        }

        summary.elapsed = started.elapsed();
        self.report(format_args!(
            "finished {} task(s) in {} stage(s) in {:?}",
            summary.tasks, summary.stages, summary.elapsed
        ));
        Ok(summary)
    }

    /// Results of every completed task, keyed by task id.
    pub fn lookup(&self) -> &Lookup<V> {
        &self.lookup
    }

    pub fn result(&self, id: TaskId) -> Option<&V> {
        self.lookup.get(&id)
    }

    /// Number of tasks registered but not planned yet.
    pub fn pending(&self) -> usize {
        self.lobby.len()
    }

    /// Drop all pending tasks, planned stages and results.
    pub fn reset(&mut self) {
        self.lobby.clear();
        self.stages.clear();
        self.planned.clear();
        self.lookup.clear();
        debug!("session reset");
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Resolve, dispatch and merge one stage. Returns the number of
    /// successfully completed tasks.
    async fn serve_stage(&mut self, stage: Stage<V>) -> Result<usize> {
        let index = stage.index();
        let size = stage.len();
        let mut tasks = stage.into_tasks();
        for task in &tasks {
            self.planned.remove(&task.id());
        }

        self.report(format_args!("stage {index}: dispatching {size} task(s)"));

        let lookup = &self.lookup;
        if let Err(err) = tasks.iter_mut().try_for_each(|task| task.resolve(lookup)) {
            warn!(stage = index, error = %err, "stage admitted a task before its prerequisites");
            self.return_to_lobby(tasks);
            return Err(err);
        }

        let mut dispatched: HashMap<TaskId, String> = tasks
            .iter()
            .map(|t| (t.id(), t.label().to_string()))
            .collect();
        let completions = match self.executor.execute_batch(tasks).await {
            Ok(completions) => completions,
            Err(err) => {
                warn!(stage = index, error = %err, "executor failed to run stage");
                self.unplan_remaining();
                return Err(err);
            }
        };

        // Every valid outcome is merged before the stage's verdict.
        let mut reported: HashSet<TaskId> = HashSet::with_capacity(completions.len());
        let mut unknown: Vec<TaskId> = Vec::new();
        let mut repeated: Vec<TaskId> = Vec::new();
        let mut failures = Vec::new();
        let mut completed = 0;

        for completion in completions {
            let id = completion.task;
            if dispatched.remove(&id).is_none() {
                if reported.contains(&id) {
                    warn!(stage = index, task = %id, "executor reported task twice");
                    repeated.push(id);
                } else {
                    warn!(stage = index, task = %id, "executor reported a task it was never given");
                    unknown.push(id);
                }
                continue;
            }
            reported.insert(id);

            match completion.outcome {
                Ok(value) => {
                    debug!(stage = index, task = %id, label = %completion.label, "task completed");
                    self.lookup.insert(id, value);
                    completed += 1;
                }
                Err(error) => {
                    warn!(stage = index, task = %id, label = %completion.label, error = %error, "task failed");
                    failures.push(TaskFailure {
                        task: id,
                        label: completion.label,
                        error,
                    });
                }
            }
        }

        let mut unreported: Vec<(TaskId, String)> = dispatched.into_iter().collect();
        unreported.sort();
        for (id, label) in unreported {
            warn!(stage = index, task = %id, label = %label, "executor reported no outcome");
            failures.push(TaskFailure {
                task: id,
                label,
                error: anyhow::anyhow!("executor reported no outcome"),
            });
        }

        if !unknown.is_empty() {
            self.unplan_remaining();
            unknown.sort();
            return Err(LazydagError::UnknownCompletion {
                stage: index,
                tasks: unknown,
            });
        }

        if let Some(id) = repeated.first() {
            self.unplan_remaining();
            return Err(LazydagError::DuplicateIdentity(*id));
        }

        if !failures.is_empty() {
            self.unplan_remaining();
            return Err(LazydagError::TaskBodyFailure {
                stage: index,
                failures,
            });
        }

        self.report(format_args!("stage {index}: finished {completed} task(s)"));
        Ok(completed)
    }

    fn return_to_lobby(&mut self, tasks: Vec<Task<V>>) {
        for task in tasks {
            self.lobby.insert(task.id(), task);
        }
        self.unplan_remaining();
    }

    /// Move every still-planned task back to the lobby.
    fn unplan_remaining(&mut self) {
        let returned: usize = self.stages.iter().map(|s| s.len()).sum();
        self.planned.clear();
        while let Some(stage) = self.stages.pop_front() {
            for task in stage.into_tasks() {
                self.lobby.insert(task.id(), task);
            }
        }
        if returned > 0 {
            debug!(tasks = returned, "unexecuted stages returned to lobby");
        }
    }

    fn report(&self, message: fmt::Arguments<'_>) {
        if self.options.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }
}

/// A [`LazyFn`] bound to a session: calling it builds a task and registers
/// it in the session's lobby.
///
/// Holds the session mutably for as long as it lives.
pub struct BoundFn<'s, V, E> {
    session: &'s mut Session<V, E>,
    lazy: LazyFn<V>,
}

impl<V: TaskValue, E: BatchExecutor<V>> BoundFn<'_, V, E> {
    pub fn call(&mut self, args: impl IntoIterator<Item = Arg<V>>) -> Result<TaskId> {
        let task = self.lazy.call(args);
        self.session.add(task)
    }

    pub fn call_with<K>(
        &mut self,
        args: impl IntoIterator<Item = Arg<V>>,
        kwargs: impl IntoIterator<Item = (K, Arg<V>)>,
    ) -> Result<TaskId>
    where
        K: Into<String>,
    {
        let task = self.lazy.call_with(args, kwargs);
        self.session.add(task)
    }

    /// The unbound function, for building tasks without registering them.
    pub fn lazy(&self) -> &LazyFn<V> {
        &self.lazy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::InlineExecutor;

    fn add(args: Args<i64>) -> anyhow::Result<i64> {
        Ok(args.get(0)? + args.get(1)?)
    }

    #[tokio::test]
    async fn adding_a_pending_id_again_is_a_no_op() {
        let mut session = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        let id = session.add(lazy.call([Arg::value(1), Arg::value(2)])).unwrap();

        let again = lazy.call([Arg::value(10), Arg::value(20)]).with_id(id);
        assert_eq!(session.add(again).unwrap(), id);
        assert_eq!(session.pending(), 1);

        session.run().await.unwrap();
        assert_eq!(session.result(id), Some(&3));
    }

    #[tokio::test]
    async fn completed_id_cannot_be_added_again() {
        let mut session = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        let id = session.add(lazy.call([Arg::value(1), Arg::value(1)])).unwrap();
        session.run().await.unwrap();

        let clash = lazy.call([Arg::value(5), Arg::value(5)]).with_id(id);
        match session.add(clash) {
            Err(LazydagError::DuplicateIdentity(dup)) => assert_eq!(dup, id),
            other => panic!("expected DuplicateIdentity, got {other:?}"),
        }
    }

    #[test]
    fn planned_id_cannot_be_added_again() {
        let mut session: Session<i64, _> = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        let id = session.add(lazy.call([Arg::value(1), Arg::value(1)])).unwrap();
        session.plan().unwrap();

        let clash = lazy.call([Arg::value(5), Arg::value(5)]).with_id(id);
        assert!(matches!(session.add(clash), Err(LazydagError::DuplicateIdentity(_))));
    }

    #[test]
    fn planning_twice_without_running_is_rejected() {
        let mut session = Session::new(InlineExecutor);
        session.wrap(add).call([Arg::value(1), Arg::value(2)]).unwrap();

        assert_eq!(session.plan().unwrap(), 1);
        assert!(matches!(
            session.plan(),
            Err(LazydagError::PlanNotConsumed { remaining: 1 })
        ));
    }

    #[test]
    fn failed_plan_leaves_lobby_untouched() {
        let mut session = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        session.add(lazy.call([Arg::value(1), Arg::value(2)])).unwrap();
        session
            .add(lazy.call([Arg::pending(TaskId::new()), Arg::value(2)]))
            .unwrap();

        assert!(session.plan().is_err());
        assert_eq!(session.pending(), 2);
        assert!(session.planned_stages().is_empty());
    }

    #[tokio::test]
    async fn stage_with_unmet_prerequisite_is_returned_not_dispatched() {
        let mut session = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        let missing = TaskId::new();
        let task = lazy.call([Arg::pending(missing), Arg::value(1)]);
        let id = task.id();

        // A stage the planner would never produce.
        session.planned.insert(id);
        session.stages.push_back(Stage::new(0, vec![task]));

        match session.run().await {
            Err(LazydagError::PrematureInvocation { task, missing: m }) => {
                assert_eq!(task, id);
                assert_eq!(m, vec![missing]);
            }
            other => panic!("expected PrematureInvocation, got {other:?}"),
        }
        assert_eq!(session.pending(), 1);
        assert!(session.planned_stages().is_empty());
        assert!(session.lookup().is_empty());
    }

    #[tokio::test]
    async fn planned_ids_are_released_once_their_stage_leaves_the_plan() {
        let mut session = Session::new(InlineExecutor);
        let lazy = Task::wrap(add);
        let a = session.add(lazy.call([Arg::value(1), Arg::value(1)])).unwrap();
        let b = session.add(lazy.call([Arg::from(a), Arg::value(1)])).unwrap();
        assert_eq!(session.plan().unwrap(), 2);
        assert_eq!(session.planned.len(), 2);

        session.run().await.unwrap();
        assert!(session.planned.is_empty());
        assert_eq!(session.result(b), Some(&3));

        // Completed ids are still rejected through the lookup table.
        let clash = lazy.call([Arg::value(0), Arg::value(0)]).with_id(b);
        assert!(matches!(session.add(clash), Err(LazydagError::DuplicateIdentity(_))));
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut session = Session::new(InlineExecutor);
        session.wrap(add).call([Arg::value(1), Arg::value(2)]).unwrap();
        session.run().await.unwrap();
        session.wrap(add).call([Arg::value(3), Arg::value(4)]).unwrap();
        session.plan().unwrap();

        session.reset();
        assert!(session.planned.is_empty());
        assert!(session.lookup().is_empty());
        assert_eq!(session.pending(), 0);
    }
}
