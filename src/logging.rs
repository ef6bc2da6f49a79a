use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::LogError;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Logs to stderr. For commands that don't own the terminal.
pub fn setup_stderr() -> Result<(), LogError> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .without_time()
        .with_filter(env_filter());
    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

/// Appends to `path`. The terminal UI owns stdout and stderr, so its logs
/// go here.
pub fn setup_file(path: &Path) -> Result<(), LogError> {
    let io_err = |source| LogError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter());
    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_logging_creates_the_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("taskdeck.log");
        setup_file(&path).unwrap();
        tracing::error!("written");
        assert!(path.exists());
    }
}
