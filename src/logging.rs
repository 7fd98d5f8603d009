//! Logging setup
//!
//! The TUI owns the terminal, so it logs to a file; plain CLI commands log
//! to stderr. `RUST_LOG` overrides the default level.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::types::{HabitcalError, Result};

const LOG_FILE_NAME: &str = "habitcal.log";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Default log file (`<data dir>/habitcal.log`)
pub fn default_log_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "habitcal")
        .ok_or_else(|| HabitcalError::Config("Cannot determine data directory".into()))?;
    Ok(dirs.data_local_dir().join(LOG_FILE_NAME))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(target: LogTarget, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(true);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    // A subscriber already installed (tests, repeated init) is not an error
    if let Err(e) = installed {
        tracing::debug!("logging already initialized: {}", e);
    }
    Ok(())
}
