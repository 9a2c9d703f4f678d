//! Runtime configuration read from environment variables.
//!
//! - `INVOICE_DATA_DIR`: where the settings database and log live
//!   (default `~/.invoice-generator`)
//! - `INVOICE_EXPORT_DIR`: where printable invoices are written
//!   (default `<data dir>/exports`)
//! - `INVOICE_LOG`: tracing filter directive (default `info`)
//! - `INVOICE_OPEN_EXPORTS`: `0`, `false`, `no` or `off` keeps exported files
//!   from being opened in the system viewer

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".invoice-generator";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "invoice.sqlite";
const LOG_FILE_NAME: &str = "invoice.log";
const EXPORT_DIR_NAME: &str = "exports";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_filter: String,
    pub open_exports: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable source. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match non_empty(lookup("INVOICE_DATA_DIR")) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let export_dir = non_empty(lookup("INVOICE_EXPORT_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(EXPORT_DIR_NAME));
        let log_filter =
            non_empty(lookup("INVOICE_LOG")).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let open_exports = lookup("INVOICE_OPEN_EXPORTS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(true);

        Ok(Self {
            data_dir,
            export_dir,
            log_filter,
            open_exports,
        })
    }

    /// Defaults rooted at an explicit directory, with the system viewer
    /// disabled.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            export_dir: data_dir.join(EXPORT_DIR_NAME),
            data_dir,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            open_exports: false,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

/// Resolve the application folder inside the user's home.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
