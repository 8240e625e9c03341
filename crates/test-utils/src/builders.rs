#![allow(dead_code)]

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail};
use lazydag::exec::BatchExecutor;
use lazydag::session::Session;
use lazydag::task::{Arg, Args, LazyFn, TaskId};

/// `a + b`, optionally `a - b` when called with keyword `add = 0`.
pub fn add(args: Args<i64>) -> anyhow::Result<i64> {
    let (a, b) = (*args.get(0)?, *args.get(1)?);
    match args.kwarg("add") {
        Some(0) => Ok(a - b),
        _ => Ok(a + b),
    }
}

/// Sum of all positional arguments.
pub fn sum(args: Args<i64>) -> anyhow::Result<i64> {
    Ok(args.positional().iter().sum())
}

/// `add` that sleeps for `latency` before returning.
pub fn slow_add(latency: Duration) -> LazyFn<i64> {
    LazyFn::named("slow_add", move |args| {
        thread::sleep(latency);
        add(args)
    })
}

/// A task body that always fails.
pub fn always_fails() -> LazyFn<i64> {
    LazyFn::named("always_fails", |_args: Args<i64>| -> anyhow::Result<i64> {
        bail!("boom")
    })
}

/// A task body that panics.
pub fn panics() -> LazyFn<i64> {
    LazyFn::named("panics", |_args: Args<i64>| -> anyhow::Result<i64> {
        panic!("task body exploded")
    })
}

/// A task body that fails for negative inputs.
pub fn checked_add() -> LazyFn<i64> {
    LazyFn::named("checked_add", |args: Args<i64>| {
        let (a, b) = (*args.get(0)?, *args.get(1)?);
        if a < 0 || b < 0 {
            return Err(anyhow!("negative input: {a}, {b}"));
        }
        Ok(a + b)
    })
}

/// Register a serial chain of `len` additions: task `i` computes
/// `previous + i`, the first starts from 0. Returns ids in chain order.
pub fn build_chain<E: BatchExecutor<i64>>(
    session: &mut Session<i64, E>,
    lazy: &LazyFn<i64>,
    len: usize,
) -> Vec<TaskId> {
    let mut bound = session.bind(lazy);
    let mut ids: Vec<TaskId> = Vec::with_capacity(len);

    for i in 0..len {
        let running = match ids.last() {
            Some(prev) => Arg::from(*prev),
            None => Arg::value(0),
        };
        let id = bound
            .call([running, Arg::value(i as i64)])
            .expect("fresh task ids never collide");
        ids.push(id);
    }

    ids
}
