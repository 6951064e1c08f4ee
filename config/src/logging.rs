//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured filter; `info` is the fallback. With a log
//! file configured, output goes there without ANSI colors; otherwise to stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::expand_env_vars;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `"invite_core=debug,info"`.
    pub filter: Option<String>,
    /// Append-only log file. Stderr when unset.
    pub file: Option<String>,
}

impl LoggingConfig {
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file
            .as_deref()
            .map(|f| PathBuf::from(expand_env_vars(f)))
    }
}

/// Install the global subscriber. Returns the log file in use, if any.
///
/// A second call is a no-op that returns `None`: the first installed subscriber stays.
pub fn init_tracing(config: &LoggingConfig) -> Option<PathBuf> {
    let env_filter = build_filter(config);

    if let Some(path) = config.file_path() {
        match open_log_file(&path) {
            Ok(file) => {
                let installed = tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .try_init()
                    .is_ok();
                if !installed {
                    return None;
                }
                tracing::info!(path = %path.display(), "Logging initialized");
                return Some(path);
            }
            Err(e) => {
                let _ = tracing_subscriber::registry()
                    .with(fmt::layer().with_writer(io::stderr))
                    .with(env_filter)
                    .try_init();
                tracing::warn!(path = %path.display(), "Failed to open log file, using stderr: {e}");
                return None;
            }
        }
    }

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .try_init();
    None
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_deref().unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
