//! Durable snapshot store for the translation cache.
//! The serialized cache map lives as one blob under a fixed key; it is read
//! once at startup and fully rewritten on every cache write. SQLite backs the
//! default implementation, in WAL mode for cheap concurrent reads.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

/// Fixed key under which the serialized cache map is stored.
pub const SNAPSHOT_KEY: &str = "translation_cache";

#[derive(Debug)]
pub enum SnapshotError {
    Storage(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Storage(msg) => write!(f, "snapshot storage error: {msg}"),
        }
    }
}

/// Key-value blob store holding the serialized cache map.
/// Implementations must never panic; callers log and swallow failures.
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot blob, if one exists.
    fn load(&self) -> Result<Option<String>, SnapshotError>;

    /// Overwrite the snapshot blob.
    fn store(&self, blob: &str) -> Result<(), SnapshotError>;

    /// Remove the snapshot blob.
    fn clear(&self) -> Result<(), SnapshotError>;
}

/// SQLite-backed snapshot store.
pub struct SqliteSnapshot {
    conn: Mutex<Connection>,
}

impl SqliteSnapshot {
    /// Open (or create) the snapshot database at the given path.
    pub fn open(db_path: &Path) -> Result<Self, SnapshotError> {
        let conn = Connection::open(db_path)
            .map_err(|e| SnapshotError::Storage(format!("failed to open snapshot db: {e}")))?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| SnapshotError::Storage(format!("PRAGMA failed: {e}")))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e| SnapshotError::Storage(format!("create table failed: {e}")))?;

        info!(path = %db_path.display(), "snapshot store opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SnapshotStore for SqliteSnapshot {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![SNAPSHOT_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| SnapshotError::Storage(format!("snapshot read failed: {e}")))
    }

    fn store(&self, blob: &str) -> Result<(), SnapshotError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![SNAPSHOT_KEY, blob],
        )
        .map_err(|e| SnapshotError::Storage(format!("snapshot write failed: {e}")))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![SNAPSHOT_KEY])
            .map_err(|e| SnapshotError::Storage(format!("snapshot clear failed: {e}")))?;
        Ok(())
    }
}

/// In-memory snapshot store for tests and cacheless embedding.
#[derive(Default)]
pub struct MemorySnapshot {
    blob: Mutex<Option<String>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with an existing blob (simulates a prior session).
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshot {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        Ok(self.blob.lock().clone())
    }

    fn store(&self, blob: &str) -> Result<(), SnapshotError> {
        *self.blob.lock() = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        *self.blob.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.db");
        let store = SqliteSnapshot::open(&path).expect("open");

        assert_eq!(store.load().expect("load"), None);
        store.store(r#"{"Hello|fr":"Bonjour"}"#).expect("store");
        assert_eq!(
            store.load().expect("load").as_deref(),
            Some(r#"{"Hello|fr":"Bonjour"}"#)
        );

        // Overwrite replaces, not appends
        store.store("{}").expect("store");
        assert_eq!(store.load().expect("load").as_deref(), Some("{}"));
    }

    #[test]
    fn sqlite_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.db");
        {
            let store = SqliteSnapshot::open(&path).expect("open");
            store.store("persisted").expect("store");
        }
        let store = SqliteSnapshot::open(&path).expect("reopen");
        assert_eq!(store.load().expect("load").as_deref(), Some("persisted"));
    }

    #[test]
    fn sqlite_clear_removes_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteSnapshot::open(&dir.path().join("s.db")).expect("open");
        store.store("x").expect("store");
        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn memory_round_trip() {
        let store = MemorySnapshot::new();
        assert_eq!(store.load().expect("load"), None);
        store.store("blob").expect("store");
        assert_eq!(store.load().expect("load").as_deref(), Some("blob"));
        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }
}
