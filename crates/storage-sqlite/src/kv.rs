use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use trackfit_core::errors::StoreError;
use trackfit_core::store::KeyValueStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

/// Durable key-value backend over a single SQLite database file.
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(io_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(io_error)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(io_error)?;
        conn.execute_batch(SCHEMA).map_err(io_error)?;
        debug!("[SqliteKv] opened {}", path.as_ref().display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private in-memory database, for tests and ephemeral profiles.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(io_error)?;
        conn.execute_batch(SCHEMA).map_err(io_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|err| err.into_inner());
            op(&conn).map_err(io_error)
        })
        .await
        .map_err(|err| StoreError::Io(format!("blocking task failed: {err}")))?
    }
}

fn io_error(err: rusqlite::Error) -> StoreError {
    StoreError::Io(err.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .map(|_| ())
        })
        .await
    }
}
