// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ExecutorKind;

/// Command-line arguments for `lazydag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lazydag",
    version,
    about = "Build a deferred task graph, group it into stages and run each stage in parallel.",
    long_about = None
)]
pub struct CliArgs {
    /// Which built-in task graph to run.
    #[arg(value_enum, default_value = "grid")]
    pub demo: DemoKind,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Lazydag.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Executor for every stage (`pool` or `inline`), overriding the
    /// config file.
    #[arg(long, value_name = "KIND")]
    pub executor: Option<ExecutorKind>,

    /// Graph size: grid side length, chain length or diamond fan-out.
    #[arg(long, default_value_t = 20)]
    pub size: usize,

    /// Simulated work per task, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10)]
    pub latency_ms: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAZYDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Plan the graph and print its stages without executing any task.
    #[arg(long)]
    pub dry_run: bool,
}

/// Built-in demo graphs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    /// `size * size` independent additions: one wide stage.
    Grid,
    /// Running sum of `size` tasks, each depending on the previous one.
    Chain,
    /// One source, `size` parallel branches, one fan-in.
    Diamond,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_grid_demo() {
        let args = CliArgs::try_parse_from(["lazydag"]).unwrap();
        assert_eq!(args.demo, DemoKind::Grid);
        assert_eq!(args.size, 20);
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_chain_with_flags() {
        let args = CliArgs::try_parse_from([
            "lazydag",
            "chain",
            "--size",
            "100",
            "--latency-ms",
            "0",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.demo, DemoKind::Chain);
        assert_eq!(args.size, 100);
        assert_eq!(args.latency_ms, 0);
        assert!(args.dry_run);
        assert_eq!(args.executor, None);
    }

    #[test]
    fn executor_flag_is_parsed_leniently() {
        let args = CliArgs::try_parse_from(["lazydag", "--executor", "Inline"]).unwrap();
        assert_eq!(args.executor, Some(ExecutorKind::Inline));

        let err = CliArgs::try_parse_from(["lazydag", "--executor", "threads"]).unwrap_err();
        assert!(err.to_string().contains("invalid executor kind"));
    }
}
