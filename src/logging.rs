//! Tracing setup. The terminal belongs to the UI, so events go to a log file
//! inside the data directory.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global subscriber writing to `config.log_path()`. An invalid
/// filter directive falls back to the default level instead of failing.
pub fn init(config: &AppConfig) -> Result<()> {
    fs::create_dir_all(&config.data_dir).context("failed to create data directory")?;
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
