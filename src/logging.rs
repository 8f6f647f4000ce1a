//! tracing subscriber setup.
//!
//! Interactive sessions own the terminal, so their logs go to a file.
//! Headless runs keep stdout for the report and log to stderr.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, otherwise the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Logs to [`log_path`], truncating the file. Falls back to no logging with a
/// warning on stderr when the file cannot be created.
pub fn init_file_logging(level: &str) {
    let path = log_path();
    match open_log_file(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter(level))
            .with_writer(file)
            .with_ansi(false)
            .init(),
        Err(e) => eprintln!("Warning: logging disabled, cannot open {}: {e}", path.display()),
    }
}

pub fn init_stderr_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `linewise/linewise.log` under the state directory, then the config
/// directory, then the temp directory.
pub fn log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("linewise").join("linewise.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("linewise.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_path() {
        let path = log_path();
        assert!(path.is_absolute());
        assert!(path.ends_with("linewise.log"));
    }

    #[test]
    fn test_open_log_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("linewise.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
