// src/demo.rs

//! Built-in task graphs used by the `lazydag` binary.
//!
//! Each graph is built with plain integer arithmetic plus an optional
//! sleep per task to make the effect of staged parallelism visible.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::cli::DemoKind;
use crate::errors::{LazydagError, Result};
use crate::exec::BatchExecutor;
use crate::session::Session;
use crate::task::{Arg, Args, LazyFn, TaskId};

#[derive(Debug, Clone, Copy)]
pub struct DemoParams {
    pub size: usize,
    /// Simulated work per task.
    pub latency: Duration,
}

/// What was registered in the session.
#[derive(Debug, Clone)]
pub struct DemoGraph {
    pub kind: DemoKind,
    pub tasks: usize,
    /// Final task whose value summarises the graph, if there is one.
    pub sink: Option<TaskId>,
    pub expected: Option<i64>,
}

pub fn add(args: Args<i64>) -> anyhow::Result<i64> {
    Ok(args.get(0)? + args.get(1)?)
}

pub fn mul(args: Args<i64>) -> anyhow::Result<i64> {
    Ok(args.get(0)? * args.get(1)?)
}

pub fn sum(args: Args<i64>) -> anyhow::Result<i64> {
    Ok(args.positional().iter().sum())
}

/// Wrap `body` so each call sleeps for `latency` first.
fn slow(label: &str, latency: Duration, body: fn(Args<i64>) -> anyhow::Result<i64>) -> LazyFn<i64> {
    LazyFn::named(label, move |args| {
        if !latency.is_zero() {
            thread::sleep(latency);
        }
        body(args)
    })
}

/// Register the chosen graph in `session`.
pub fn build<E: BatchExecutor<i64>>(
    kind: DemoKind,
    params: DemoParams,
    session: &mut Session<i64, E>,
) -> Result<DemoGraph> {
    let graph = match kind {
        DemoKind::Grid => build_grid(params, session)?,
        DemoKind::Chain => build_chain(params, session)?,
        DemoKind::Diamond => build_diamond(params, session)?,
    };
    debug!(?kind, tasks = graph.tasks, "demo graph registered");
    Ok(graph)
}

fn as_value(n: usize) -> Result<i64> {
    i64::try_from(n).map_err(|_| too_large(n))
}

fn too_large(size: usize) -> LazydagError {
    LazydagError::ConfigError(format!("demo size {size} is too large"))
}

fn build_grid<E: BatchExecutor<i64>>(params: DemoParams, session: &mut Session<i64, E>) -> Result<DemoGraph> {
    let tasks = params
        .size
        .checked_mul(params.size)
        .ok_or_else(|| too_large(params.size))?;
    let lazy = slow("add", params.latency, add);
    let mut add = session.bind(&lazy);

    for i in 0..params.size {
        for j in 0..params.size {
            add.call([Arg::value(as_value(i)?), Arg::value(as_value(j)?)])?;
        }
    }

    Ok(DemoGraph {
        kind: DemoKind::Grid,
        tasks,
        sink: None,
        expected: None,
    })
}

fn build_chain<E: BatchExecutor<i64>>(params: DemoParams, session: &mut Session<i64, E>) -> Result<DemoGraph> {
    // Running sum of 0..n is n(n-1)/2.
    let n = as_value(params.size)?;
    let expected = n
        .checked_mul((n - 1).max(0))
        .map(|twice| twice / 2)
        .ok_or_else(|| too_large(params.size))?;

    let lazy = slow("add", params.latency, add);
    let mut add = session.bind(&lazy);

    let mut prev: Option<TaskId> = None;
    for i in 0..params.size {
        let running = match prev {
            Some(id) => Arg::from(id),
            None => Arg::value(0),
        };
        prev = Some(add.call([running, Arg::value(as_value(i)?)])?);
    }

    Ok(DemoGraph {
        kind: DemoKind::Chain,
        tasks: params.size,
        sink: prev,
        expected: Some(expected),
    })
}

fn build_diamond<E: BatchExecutor<i64>>(params: DemoParams, session: &mut Session<i64, E>) -> Result<DemoGraph> {
    let add = slow("add", params.latency, add);
    let mul = slow("mul", params.latency, mul);
    let sum = slow("sum", params.latency, sum);
    // n * (1 + 2 + ... + n)
    let n = as_value(params.size)?;
    let expected = n
        .checked_add(1)
        .and_then(|m| n.checked_mul(m))
        .and_then(|triangle| n.checked_mul(triangle / 2))
        .ok_or_else(|| too_large(params.size))?;
    let tasks = params.size.checked_add(3).ok_or_else(|| too_large(params.size))?;

    let source = session.add(add.call([Arg::value(n), Arg::value(0)]))?;
    // Ordering-only: runs after the source without consuming its value.
    let checkpoint = session.add(add.call([Arg::value(0), Arg::value(0)]).after(source))?;

    let mut branches = Vec::with_capacity(params.size);
    for k in 1..=params.size {
        let id = session.add(mul.call([Arg::from(source), Arg::value(as_value(k)?)]))?;
        branches.push(Arg::from(id));
    }

    let sink = session.add(sum.call(branches).after(checkpoint))?;

    Ok(DemoGraph {
        kind: DemoKind::Diamond,
        tasks,
        sink: Some(sink),
        expected: Some(expected),
    })
}
