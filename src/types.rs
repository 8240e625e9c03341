// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// Which batch executor runs each stage.
///
/// - `Pool`: tasks of a stage run concurrently on Tokio's blocking pool
///   (default).
/// - `Inline`: tasks of a stage run one after another on the session's
///   thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    #[default]
    Pool,
    Inline,
}

impl FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pool" => Ok(ExecutorKind::Pool),
            "inline" => Ok(ExecutorKind::Inline),
            other => Err(format!(
                "invalid executor kind: {other} (expected \"pool\" or \"inline\")"
            )),
        }
    }
}
