// SQLite-backed credential store
// Credentials live in a single auth_kv key-value table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::CredentialStore;

/// Credential store persisted to a local SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| {
            format!("Failed to open credential database: {}", path.display())
        })?;
        Self::init(conn)
    }

    /// Open an in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory credential database")?;
        Self::init(conn)
    }

    /// Open the store at the platform default location
    pub fn open_default() -> Result<Self> {
        let path = default_db_path().context("Could not determine user data directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        Self::open(&path)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to initialize auth_kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Default database path under the user data directory
fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("blogline").join("credentials.sqlite3"))
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT value FROM auth_kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("Failed to read credential key: {key}"))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )
        .with_context(|| format!("Failed to write credential key: {key}"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM auth_kv WHERE key = ?1", [key])
            .with_context(|| format!("Failed to delete credential key: {key}"))?;
        Ok(())
    }
}
