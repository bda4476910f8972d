//! apismoke - run the API smoke test plan once and log a report
//!
//! The exit code does not reflect test outcomes; read the log.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use apismoke::config::DEFAULT_BASE_URL;
use apismoke::{RunnerConfig, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "apismoke")]
#[command(author, version, about = "End-to-end smoke tests for the project board API")]
#[command(long_about = "End-to-end smoke tests for the project board API.\n\n\
Run with no arguments to execute the full plan once against http://localhost:3000, \
pausing one second between steps and logging to ./api_test_<timestamp>.log. \
Every option below is an override of that default run.")]
struct Args {
    /// Base URL of the service under test
    #[arg(long, env = "APISMOKE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Pause after each step, in milliseconds
    #[arg(long, env = "APISMOKE_STEP_DELAY_MS", default_value = "1000")]
    step_delay_ms: u64,

    /// Per-request timeout in seconds (unset = wait indefinitely)
    #[arg(long, env = "APISMOKE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Directory for the run log file
    #[arg(long, env = "APISMOKE_LOG_DIR", default_value = ".")]
    log_dir: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> RunnerConfig {
        RunnerConfig {
            base_url: self.base_url,
            step_delay: Duration::from_millis(self.step_delay_ms),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            log_dir: self.log_dir,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let verbose = args.verbose;
    let config = args.into_config().validate()?;

    let log_path = apismoke::logging::init(&config.log_dir, verbose)
        .with_context(|| format!("cannot set up logging in {}", config.log_dir.display()))?;
    info!("Logging to {}", log_path.display());

    let mut runner = TestRunner::with_config(config)?;
    runner.run_all().await?;

    Ok(())
}
