// tests/config_loading.rs

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use lazydag::config::{load_and_validate, load_from_path};
use lazydag::errors::LazydagError;
use lazydag::exec::ConfiguredExecutor;
use lazydag::types::ExecutorKind;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("Lazydag.toml");
    fs::write(&path, contents).expect("failed to write config");
    path
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "");

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.executor.kind, ExecutorKind::Pool);
    assert_eq!(cfg.executor.max_concurrency, None);
    assert!(cfg.session.verbose);
    assert!(matches!(
        cfg.build_executor(),
        ConfiguredExecutor::Pool(ref pool) if pool.max_concurrency().is_none()
    ));
    Ok(())
}

#[test]
fn full_file_is_parsed() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[executor]
kind = "pool"
max_concurrency = 4

[session]
verbose = false
"#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.executor.max_concurrency, Some(4));
    assert!(!cfg.session_options().verbose);
    match cfg.build_executor() {
        ConfiguredExecutor::Pool(pool) => assert_eq!(pool.max_concurrency(), Some(4)),
        other => panic!("expected pool executor, got {other:?}"),
    }
    Ok(())
}

#[test]
fn inline_kind_builds_inline_executor() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[executor]\nkind = \"inline\"\n");

    let cfg = load_and_validate(&path)?;
    assert!(matches!(cfg.build_executor(), ConfiguredExecutor::Inline(_)));
    Ok(())
}

#[test]
fn unknown_executor_kind_is_a_toml_error() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[executor]\nkind = \"gpu\"\n");

    match load_from_path(&path) {
        Err(LazydagError::TomlError(_)) => Ok(()),
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn zero_max_concurrency_is_rejected_after_parsing() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[executor]\nmax_concurrency = 0\n");

    // Parses fine; only validation rejects it.
    load_from_path(&path)?;
    match load_and_validate(&path) {
        Err(LazydagError::ConfigError(msg)) => {
            assert!(msg.contains("max_concurrency"));
            Ok(())
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(load_and_validate(&path), Err(LazydagError::IoError(_))));
}
