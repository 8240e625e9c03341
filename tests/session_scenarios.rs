// tests/session_scenarios.rs

mod common;
use crate::common::builders::{add, build_chain, slow_add, sum};
use crate::common::{batch_of, init_tracing, recorded_inline_session, with_timeout};

use std::time::{Duration, Instant};

use lazydag::exec::{InlineExecutor, PoolExecutor};
use lazydag::session::Session;
use lazydag::task::{Arg, LazyFn, Task};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn dependent_task_sees_upstream_result() -> TestResult {
    init_tracing();

    let (mut session, log) = recorded_inline_session();
    let add = Task::wrap(add);

    let t1 = session.add(add.call([Arg::value(1), Arg::value(2)]))?;
    let t2 = session.add(add.call([Arg::from(t1), Arg::value(10)]))?;

    session.run().await?;

    assert_eq!(session.lookup()[t1], 3);
    assert_eq!(session.lookup()[t2], 13);
    assert!(batch_of(&log, t1) < batch_of(&log, t2));
    Ok(())
}

#[tokio::test]
async fn keyword_arguments_are_passed_through() -> TestResult {
    let mut session = Session::new(InlineExecutor);
    let id = session
        .wrap(add)
        .call_with([Arg::value(2), Arg::value(1)], [("add", Arg::value(0))])?;

    session.run().await?;
    assert_eq!(session.result(id), Some(&1));
    Ok(())
}

#[tokio::test]
async fn keyword_placeholder_waits_for_its_task() -> TestResult {
    let (mut session, log) = recorded_inline_session();
    let add = Task::wrap(add);

    let zero = session.add(add.call([Arg::value(0), Arg::value(0)]))?;
    let diff = session.add(add.call_with([Arg::value(7), Arg::value(2)], [("add", Arg::from(zero))]))?;

    session.run().await?;
    assert_eq!(session.result(diff), Some(&5));
    assert_eq!(batch_of(&log, zero), Some(0));
    assert_eq!(batch_of(&log, diff), Some(1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wide_fan_out_runs_in_one_parallel_stage() -> TestResult {
    init_tracing();

    let latency = Duration::from_millis(10);
    let single = {
        let started = Instant::now();
        slow_add(latency).call([Arg::value(1), Arg::value(1)]).invoke()?;
        started.elapsed()
    };

    let mut session = Session::new(PoolExecutor::new());
    let lazy = slow_add(latency);
    {
        let mut add = session.bind(&lazy);
        for i in 0..20 {
            for j in 0..20 {
                add.call([Arg::value(i), Arg::value(j)])?;
            }
        }
    }

    assert_eq!(session.plan()?, 1);

    let started = Instant::now();
    let summary = with_timeout(session.run()).await?;
    let parallel = started.elapsed();

    assert_eq!(summary.stages, 1);
    assert_eq!(session.lookup().len(), 400);
    assert!(
        parallel < single * 400 / 4,
        "400 tasks took {parallel:?}, single task {single:?}"
    );
    Ok(())
}

#[tokio::test]
async fn serial_chain_plans_one_stage_per_task() -> TestResult {
    let mut session = Session::new(InlineExecutor);
    let lazy = LazyFn::named("add", add);
    let ids = build_chain(&mut session, &lazy, 100);

    assert_eq!(session.plan()?, 100);
    let stages = session.planned_stages();
    for (stage, id) in stages.iter().zip(ids.iter()) {
        assert_eq!(stage, &vec![*id]);
    }

    let summary = session.run().await?;
    assert_eq!(summary.stages, 100);
    assert_eq!(session.lookup().len(), 100);
    assert_eq!(session.result(ids[99]), Some(&4950));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pool_results_match_sequential_evaluation() -> TestResult {
    let lazy = LazyFn::named("add", add);

    let mut pooled = Session::new(PoolExecutor::with_max_concurrency(3));
    let pooled_ids = build_chain(&mut pooled, &lazy, 25);
    pooled.run().await?;

    let mut sequential = Session::new(InlineExecutor);
    let sequential_ids = build_chain(&mut sequential, &lazy, 25);
    sequential.run().await?;

    for (p, s) in pooled_ids.iter().zip(sequential_ids.iter()) {
        assert_eq!(pooled.result(*p), sequential.result(*s));
    }
    Ok(())
}

#[tokio::test]
async fn ordering_only_prerequisite_delays_without_consuming() -> TestResult {
    let (mut session, log) = recorded_inline_session();
    let add = Task::wrap(add);

    let first = session.add(add.call([Arg::value(100), Arg::value(0)]))?;
    let after = session.add(add.call([Arg::value(1), Arg::value(1)]).after(first))?;

    session.run().await?;
    assert_eq!(session.result(after), Some(&2));
    assert_eq!(batch_of(&log, first), Some(0));
    assert_eq!(batch_of(&log, after), Some(1));
    Ok(())
}

#[tokio::test]
async fn fan_in_collects_every_branch() -> TestResult {
    let (mut session, log) = recorded_inline_session();
    let add = Task::wrap(add);
    let sum = LazyFn::named("sum", sum);

    let branches: Vec<_> = (1..=5)
        .map(|k| session.add(add.call([Arg::value(k), Arg::value(0)])))
        .collect::<Result<_, _>>()?;
    let total = session.add(sum.call(branches.iter().map(|id| Arg::from(*id))))?;

    session.run().await?;
    assert_eq!(session.result(total), Some(&15));

    let batches = log.lock().unwrap().clone();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 5);
    assert_eq!(batches[1], vec![total]);
    Ok(())
}

#[tokio::test]
async fn later_runs_can_build_on_earlier_results() -> TestResult {
    let mut session = Session::new(InlineExecutor);
    let add = Task::wrap(add);

    let base = session.add(add.call([Arg::value(20), Arg::value(1)]))?;
    let first = session.run().await?;
    assert_eq!(first.tasks, 1);

    let doubled = session.add(add.call([Arg::from(base), Arg::from(base)]))?;
    let second = session.run().await?;

    assert_eq!(second.tasks, 1);
    assert_eq!(session.result(doubled), Some(&42));
    assert_eq!(session.lookup().len(), 2);
    Ok(())
}

#[tokio::test]
async fn tasks_added_after_explicit_plan_still_run() -> TestResult {
    let mut session = Session::new(InlineExecutor);
    let add = Task::wrap(add);

    let a = session.add(add.call([Arg::value(1), Arg::value(1)]))?;
    session.plan()?;
    let b = session.add(add.call([Arg::from(a), Arg::value(1)]))?;

    let summary = session.run().await?;
    assert_eq!(summary.stages, 2);
    assert_eq!(session.result(b), Some(&3));
    Ok(())
}

#[tokio::test]
async fn running_an_empty_session_is_a_no_op() -> TestResult {
    let mut session: Session<i64, _> = Session::new(InlineExecutor);
    let summary = session.run().await?;
    assert_eq!(summary.stages, 0);
    assert_eq!(summary.tasks, 0);
    assert!(session.lookup().is_empty());
    Ok(())
}
