//! `SQLite`-based item backend.
//!
//! Provides durable storage for items using `SQLite`. The `content` column is
//! indexed but not `UNIQUE`; rows written by other processes may repeat a
//! value, and lookups return all of them.

use crate::models::{Item, ItemId};
use crate::storage::lock::acquire_lock;
use crate::storage::metrics::OperationTimer;
use crate::storage::traits::ItemBackend;
use crate::{Error, Result, current_timestamp};
use rusqlite::{Connection, Row, params};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::instrument;

/// How long a statement waits on another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite`-based item backend.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` because `rusqlite::Connection` is not `Sync`.
/// Lookups and inserts from different threads are serialized on this mutex,
/// which is independent of the reservation set used by the save path.
pub struct SqliteItemBackend {
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteItemBackend {
    /// Opens (or creates) a database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::OperationFailed {
            operation: "open_sqlite".to_string(),
            cause: format!("{}: {e}", db_path.display()),
        })?;
        enable_wal(&conn);

        let backend = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        backend.initialize()?;
        Ok(backend)
    }

    /// Creates an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_sqlite_in_memory".to_string(),
            cause: e.to_string(),
        })?;

        let backend = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        backend.initialize()?;
        Ok(backend)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        conn.busy_timeout(BUSY_TIMEOUT)
            .and_then(|()| conn.pragma_update(None, "synchronous", "NORMAL"))
            .map_err(|e| Error::OperationFailed {
                operation: "configure_sqlite".to_string(),
                cause: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_items_content ON items(content);",
        )
        .map_err(|e| Error::OperationFailed {
            operation: "create_items_table".to_string(),
            cause: e.to_string(),
        })?;

        Ok(())
    }

    fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        let id: i64 = row.get(0)?;
        let content: String = row.get(1)?;
        let created_at: i64 = row.get(2)?;
        Ok(Item::new(
            ItemId::new(id),
            content,
            u64::try_from(created_at).unwrap_or(0),
        ))
    }

    fn query_items(
        conn: &Connection,
        operation: &str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Item>> {
        let mut stmt = conn.prepare(sql).map_err(|e| Error::OperationFailed {
            operation: format!("prepare_{operation}"),
            cause: e.to_string(),
        })?;

        let rows = stmt
            .query_map(params, Self::item_from_row)
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })
    }
}

/// Switches a file database to WAL so readers in other processes do not
/// block the writer. Failure leaves the default rollback journal in place.
fn enable_wal(conn: &Connection) {
    match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0)) {
        Ok(mode) => tracing::debug!(journal_mode = %mode, "Configured SQLite journal"),
        Err(e) => tracing::warn!(error = %e, "Could not enable WAL, using default journal"),
    }
}

impl ItemBackend for SqliteItemBackend {
    #[instrument(skip(self, content), fields(operation = "find_by_content", backend = "sqlite", content_length = content.len()))]
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        let timer = OperationTimer::start("sqlite", "find_by_content");
        let conn = acquire_lock(&self.conn);
        timer.finish(Self::query_items(
            &conn,
            "find_by_content",
            "SELECT id, content, created_at FROM items WHERE content = ?1 ORDER BY id",
            params![content],
        ))
    }

    #[instrument(skip(self, content), fields(operation = "persist", backend = "sqlite", content_length = content.len()))]
    fn persist(&self, content: &str) -> Result<Item> {
        let timer = OperationTimer::start("sqlite", "persist");
        let created_at = current_timestamp();
        let conn = acquire_lock(&self.conn);

        // Insert and rowid read happen under one lock, so the id is ours.
        let inserted = conn
            .execute(
                "INSERT INTO items (content, created_at) VALUES (?1, ?2)",
                params![content, i64::try_from(created_at).unwrap_or(i64::MAX)],
            )
            .map(|_| Item::new(ItemId::new(conn.last_insert_rowid()), content, created_at))
            .map_err(|e| Error::OperationFailed {
                operation: "persist_item".to_string(),
                cause: e.to_string(),
            });

        if let Ok(item) = &inserted {
            tracing::debug!(item.id = %item.id, "Persisted item");
        }
        timer.finish(inserted)
    }

    #[instrument(skip(self), fields(operation = "list_all", backend = "sqlite"))]
    fn list_all(&self) -> Result<Vec<Item>> {
        let timer = OperationTimer::start("sqlite", "list_all");
        let conn = acquire_lock(&self.conn);
        timer.finish(Self::query_items(
            &conn,
            "list_all",
            "SELECT id, content, created_at FROM items ORDER BY id",
            [],
        ))
    }

    fn count(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .map_err(|e| Error::OperationFailed {
                operation: "count_items".to_string(),
                cause: e.to_string(),
            })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
