use std::{fs::File, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Routes tracing output to `path`. The terminal owns stdout, so without a
/// log file no subscriber is installed and events are dropped.
pub fn init_logging(path: Option<&Path>) -> Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    let file = File::create(path)
        .with_context(|| format!("creating log file {} failed", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber failed: {err}"))?;
    tracing::info!(path = %path.display(), "logging initialised");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_installs_nothing() {
        assert!(!init_logging(None).expect("no-op"));
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = init_logging(Some(&dir.path().join("missing").join("run.log")))
            .expect_err("parent directory does not exist");
        assert!(err.to_string().starts_with("creating log file"));
    }
}
