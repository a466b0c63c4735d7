//! SQLite key-value store.

use crate::domain::error::JournalError;
use crate::ports::store_port::KeyValueStore;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use std::path::Path;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn open(db_path: &Path, pool_size: u32) -> Result<Self, JournalError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| JournalError::Storage {
                    reason: e.to_string(),
                })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, JournalError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::Storage {
                reason: e.to_string(),
            })?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, JournalError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| JournalError::Storage {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(|e: rusqlite::Error| JournalError::Storage {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl KeyValueStore for SqliteAdapter {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        let conn = self.connection()?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e: rusqlite::Error| JournalError::Storage {
            reason: e.to_string(),
        })
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )
        .map_err(|e: rusqlite::Error| JournalError::Storage {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
