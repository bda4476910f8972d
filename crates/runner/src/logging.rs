//! Console + per-run log file setup

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{SmokeError, SmokeResult};

/// Log file name for a run started at `at`
pub fn log_file_name(at: &DateTime<Local>) -> String {
    format!("api_test_{}.log", at.format("%Y%m%d_%H%M%S"))
}

/// Install the global subscriber: stdout plus a timestamped file in `log_dir`
///
/// Returns the path of the log file.
pub fn init(log_dir: &Path, verbose: bool) -> SmokeResult<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file_name(&Local::now()));
    let file = File::create(&path)?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| SmokeError::Logging(e.to_string()))?;

    Ok(path)
}
