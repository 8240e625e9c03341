// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{LazydagError, Result};
use crate::types::ExecutorKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LazydagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.executor, raw.session))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_executor(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawConfigFile) -> Result<()> {
    // `kind` is strongly typed and validated during deserialization.

    if cfg.executor.max_concurrency == Some(0) {
        return Err(LazydagError::ConfigError(
            "[executor].max_concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.executor.kind == ExecutorKind::Inline && cfg.executor.max_concurrency.is_some() {
        warn!("[executor].max_concurrency has no effect with kind = \"inline\"");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ExecutorSection;

    #[test]
    fn zero_concurrency_is_rejected() {
        let raw = RawConfigFile {
            executor: ExecutorSection {
                kind: ExecutorKind::Pool,
                max_concurrency: Some(0),
            },
            ..Default::default()
        };

        match ConfigFile::try_from(raw) {
            Err(LazydagError::ConfigError(msg)) => assert!(msg.contains("max_concurrency")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.executor.kind, ExecutorKind::Pool);
        assert!(cfg.session_options().verbose);
    }
}
