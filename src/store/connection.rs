use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::config::AppConfig;

use super::SqliteStore;

/// Ensure the data directory exists, open the settings database inside it and
/// run the lazy schema setup.
pub fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    let db_path = config.db_path();

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(&db_path).context("failed to open SQLite database")?;
    let store = SqliteStore::new(conn).context("failed to create settings table")?;
    info!(path = %db_path.display(), "opened settings database");
    Ok(store)
}
