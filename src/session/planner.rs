// src/session/planner.rs

//! Pure stage planning.
//!
//! Repeatedly sweeps the pending tasks for those whose prerequisites are all
//! satisfied (completed earlier, or placed in a previous stage of this plan)
//! and groups each sweep's finds into one stage. No Tokio, no executor and
//! no task bodies are involved, so this is tested on plain id graphs.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::errors::{LazydagError, Result};
use crate::task::TaskId;

/// Ordered stages of task ids; tasks within one stage are independent.
pub type StagePlan = Vec<Vec<TaskId>>;

/// Group `pending` tasks (id -> prerequisite ids) into ordered stages.
///
/// `is_completed` reports whether an id already has a result from an
/// earlier run. Each sweep takes every task whose prerequisites are
/// satisfied by what came before that sweep; tasks found in the same sweep
/// never satisfy each other.
///
/// Fails with [`LazydagError::UnresolvableGraph`] listing the stuck tasks
/// if a sweep finds nothing while tasks remain (a cycle, or a prerequisite
/// that is neither pending nor completed).
pub fn plan_stages<F>(pending: &HashMap<TaskId, Vec<TaskId>>, is_completed: F) -> Result<StagePlan>
where
    F: Fn(&TaskId) -> bool,
{
    // Sorted for deterministic stage contents across runs.
    let mut remaining: Vec<TaskId> = pending.keys().copied().collect();
    remaining.sort();

    let mut staged: HashSet<TaskId> = HashSet::with_capacity(remaining.len());
    let mut stages: StagePlan = Vec::new();

    while !remaining.is_empty() {
        let (ready, blocked): (Vec<TaskId>, Vec<TaskId>) =
            remaining.into_iter().partition(|id| {
                pending.get(id).is_none_or(|deps| {
                    deps.iter()
                        .all(|dep| staged.contains(dep) || is_completed(dep))
                })
            });

        if ready.is_empty() {
            warn!(
                blocked = blocked.len(),
                planned = stages.len(),
                "no pending task can become ready; graph has a cycle or an unknown prerequisite"
            );
            return Err(LazydagError::UnresolvableGraph { blocked });
        }

        debug!(stage = stages.len(), tasks = ready.len(), "planned stage");

        staged.extend(ready.iter().copied());
        stages.push(ready);
        remaining = blocked;
    }

    Ok(stages)
}
