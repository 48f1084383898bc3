//! SQLite-based record cache.

use super::traits::RecordCache;
use crate::config::DatasetConfig;
use crate::error::{FunderError, Result};
use crate::models::Funder;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const VERSION_KEY: &str = "version";

/// SQLite-backed [`RecordCache`].
///
/// The connection is created lazily by [`RecordCache::open`] and guarded by a
/// mutex, so one cache can be shared across blocking tasks.
pub struct SqliteRecordCache {
    db_path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteRecordCache {
    /// Cache backed by the database file at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: Mutex::new(None),
        }
    }

    /// Cache stored under `dir` using the default database name.
    pub fn in_directory(dir: impl AsRef<Path>) -> Self {
        Self::new(
            dir.as_ref()
                .join(format!("{}.sqlite", DatasetConfig::CACHE_DB_NAME)),
        )
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FunderError::storage(format!(
                        "Failed to create cache directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| {
            FunderError::storage(format!("Failed to open cache database: {}", e))
        })?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            -- One row per funder, stored as the original JSON object
            CREATE TABLE IF NOT EXISTS funders (
                id TEXT PRIMARY KEY,
                record TEXT NOT NULL
            );

            -- Single-entry store for the dataset version marker
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| FunderError::storage(format!("Failed to initialize cache schema: {}", e)))?;

        Ok(conn)
    }

    fn with_conn<T>(&self, op: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.conn.lock().map_err(|e| FunderError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| FunderError::storage("Cache used before open()"))?;
        op(conn)
    }
}

impl RecordCache for SqliteRecordCache {
    fn open(&self) -> Result<()> {
        let mut guard = self.conn.lock().map_err(|e| FunderError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })?;
        if guard.is_none() {
            *guard = Some(Self::connect(&self.db_path)?);
            debug!("Opened record cache at {}", self.db_path.display());
        }
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<Funder>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, record FROM funders")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut funders = Vec::with_capacity(rows.len());
            for (id, json) in rows {
                match serde_json::from_str::<Funder>(&json) {
                    Ok(funder) => funders.push(funder),
                    Err(e) => warn!("Skipping unreadable cached record {}: {}", id, e),
                }
            }
            Ok(funders)
        })
    }

    fn put_batch(&self, records: &[Funder]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("INSERT OR REPLACE INTO funders (id, record) VALUES (?1, ?2)")?;
                for funder in records {
                    let json = serde_json::to_string(funder)?;
                    stmt.execute(params![funder.id, json])?;
                }
            }
            // Dropping an uncommitted transaction rolls it back.
            tx.commit()?;
            Ok(())
        })
    }

    fn get_version(&self) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let version = conn
                .query_row(
                    "SELECT value FROM meta WHERE key = ?1",
                    params![VERSION_KEY],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(version)
        })
    }

    fn set_version(&self, version: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![VERSION_KEY, version],
            )?;
            Ok(())
        })
    }

    fn clear_version(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM meta WHERE key = ?1", params![VERSION_KEY])?;
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM funders", [])?;
            debug!("Cleared {} cached funders", deleted);
            Ok(())
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM funders", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}
