//! Typed errors for the library layer. The UI and `main.rs` fold these into
//! `anyhow::Error` so the footer can show the innermost cause.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the settings backend. Reads never produce one of these: a
/// backend that cannot answer is treated as holding no prior value.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Reasons a logo image could not be turned into a data URL.
#[derive(Debug, Error)]
pub enum LogoError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("logo is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Failures while exporting the printable invoice.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render invoice template: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
