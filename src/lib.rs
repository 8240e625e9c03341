// src/lib.rs

//! Deferred task graphs executed in parallel stages.
//!
//! Functions are wrapped into [`LazyFn`](task::LazyFn)s; calling one yields a
//! [`Task`](task::Task) instead of a value. Passing a task's
//! [`output`](task::Task::output) as another task's argument records a
//! prerequisite. A [`Session`](session::Session) groups its registered
//! tasks into stages of mutually independent tasks and runs the stages in
//! order, each one in parallel through a [`BatchExecutor`](exec::BatchExecutor).

pub mod cli;
pub mod config;
pub mod demo;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod session;
pub mod task;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, ConfigFile};
use crate::demo::{DemoGraph, DemoParams};
use crate::exec::BatchExecutor;
use crate::session::{RunSummary, Session};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - executor + session construction
/// - building the selected demo graph
/// - planning (dry run) or running it and printing the outcome
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = apply_overrides(load_config(args.config.as_deref())?, &args);
    debug!(?cfg, "configuration loaded");

    let mut session = Session::with_options(cfg.build_executor(), cfg.session_options());

    let params = DemoParams {
        size: args.size,
        latency: Duration::from_millis(args.latency_ms),
    };
    let graph = demo::build(args.demo, params, &mut session)?;
    info!(demo = ?graph.kind, tasks = graph.tasks, "task graph registered");

    if args.dry_run {
        session.plan()?;
        print_dry_run(&graph, &session);
        return Ok(());
    }

    let summary = session.run().await?;
    print_summary(&graph, &session, &summary, params);
    Ok(())
}

/// Explicit `--config` must load; otherwise `Lazydag.toml` is used when
/// present, falling back to defaults.
fn load_config(explicit: Option<&str>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return Ok(load_and_validate(path)?);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        info!(path = %fallback.display(), "using config from current directory");
        return Ok(load_and_validate(&fallback)?);
    }

    Ok(ConfigFile::default())
}

/// CLI flags take precedence over the config file.
fn apply_overrides(mut cfg: ConfigFile, args: &CliArgs) -> ConfigFile {
    if let Some(kind) = args.executor {
        debug!(?kind, "executor kind overridden from the command line");
        cfg.executor.kind = kind;
    }
    cfg
}

/// Print the planned stages without running anything.
fn print_dry_run<E: BatchExecutor<i64>>(graph: &DemoGraph, session: &Session<i64, E>) {
    let stages = session.planned_stages();

    println!("lazydag dry-run");
    println!("  demo = {:?}", graph.kind);
    println!("  tasks = {}", graph.tasks);
    println!();

    println!("stages ({}):", stages.len());
    for (index, ids) in stages.iter().enumerate() {
        let preview: Vec<String> = ids.iter().take(4).map(|id| id.to_string()).collect();
        let more = ids.len().saturating_sub(preview.len());
        if more > 0 {
            println!("  - stage {index}: {} task(s) [{} … +{more}]", ids.len(), preview.join(", "));
        } else {
            println!("  - stage {index}: {} task(s) [{}]", ids.len(), preview.join(", "));
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_summary<E: BatchExecutor<i64>>(
    graph: &DemoGraph,
    session: &Session<i64, E>,
    summary: &RunSummary,
    params: DemoParams,
) {
    let sequential = params
        .latency
        .saturating_mul(u32::try_from(graph.tasks).unwrap_or(u32::MAX));

    println!(
        "{:?}: {} task(s) in {} stage(s), {:?} (sequential estimate {:?})",
        graph.kind, summary.tasks, summary.stages, summary.elapsed, sequential
    );

    if let Some(sink) = graph.sink {
        match (session.result(sink), graph.expected) {
            (Some(value), Some(expected)) => println!("result = {value} (expected {expected})"),
            (Some(value), None) => println!("result = {value}"),
            (None, _) => println!("result missing for task {sink}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::exec::ConfiguredExecutor;
    use crate::types::ExecutorKind;

    #[test]
    fn executor_flag_overrides_config_kind() {
        let args = CliArgs::try_parse_from(["lazydag", "--executor", "inline"]).unwrap();
        let cfg = apply_overrides(ConfigFile::default(), &args);

        assert_eq!(cfg.executor.kind, ExecutorKind::Inline);
        assert!(matches!(cfg.build_executor(), ConfiguredExecutor::Inline(_)));
    }

    #[test]
    fn config_kind_is_kept_without_flag() {
        let args = CliArgs::try_parse_from(["lazydag"]).unwrap();
        let cfg = apply_overrides(ConfigFile::default(), &args);
        assert_eq!(cfg.executor.kind, ExecutorKind::Pool);
    }
}
