use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::StoreError;

use super::SettingsStore;

/// Settings persisted in the `settings` table of the application database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an open connection, creating the settings table when missing.
    pub fn new(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// A throwaway database, handy for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(Connection::open_in_memory()?)
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl SettingsStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read setting, treating it as unset");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}
