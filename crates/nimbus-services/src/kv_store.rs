//! Key-value storage trait and backends.
//!
//! The screen persists exactly one value (the last selected city), so the
//! abstraction is a plain string map. Implementations must be usable from
//! several tasks at once; interior locking is their business.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use nimbus_core::StoreError;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

/// Result type for key-value operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent string-to-string storage.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Volatile store for tests and for running without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store; one `kv` table.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKeyValueStore").finish_non_exhaustive()
    }
}

impl SqliteKeyValueStore {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        tracing::info!("Opened key-value store at {}", path.display());
        Ok(store)
    }

    /// In-memory database (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn
            .lock()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .map_err(|e| StoreError::Unavailable(format!("Failed to initialize schema: {e}")))
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map(|_| ())
            .map_err(|e| StoreError::Write(e.to_string()))
    }
}
