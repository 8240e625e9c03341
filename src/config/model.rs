// src/config/model.rs

use serde::Deserialize;

use crate::exec::{ConfiguredExecutor, InlineExecutor, PoolExecutor};
use crate::session::SessionOptions;
use crate::types::ExecutorKind;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// kind = "pool"
/// max_concurrency = 8
///
/// [session]
/// verbose = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub session: SessionSection,
}

/// `[executor]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorSection {
    /// `"pool"` (default) or `"inline"`.
    #[serde(default)]
    pub kind: ExecutorKind,

    /// Upper bound on task bodies running at once. `None` means every task
    /// of a stage is dispatched immediately. Ignored by `inline`.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Report stage progress at `info` level instead of `debug`.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_verbose() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
        }
    }
}

/// Validated configuration. Obtain one through `ConfigFile::try_from` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub executor: ExecutorSection,
    pub session: SessionSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(executor: ExecutorSection, session: SessionSection) -> Self {
        Self { executor, session }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            verbose: self.session.verbose,
        }
    }

    /// Build the executor described by `[executor]`.
    pub fn build_executor(&self) -> ConfiguredExecutor {
        match self.executor.kind {
            ExecutorKind::Pool => match self.executor.max_concurrency {
                Some(max) => ConfiguredExecutor::Pool(PoolExecutor::with_max_concurrency(max)),
                None => ConfiguredExecutor::Pool(PoolExecutor::new()),
            },
            ExecutorKind::Inline => ConfiguredExecutor::Inline(InlineExecutor),
        }
    }
}
