//! Database connection management
//!
//! Provides SQLite connection pooling for the persistent storage backends.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Where a database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A SQLite file; parent directories are created on open
    File(PathBuf),
    /// A private in-memory database, gone when the pool is dropped
    Memory,
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
            DatabaseLocation::Memory => write!(f, ":memory:"),
        }
    }
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open a pool on a SQLite file
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA cache_size = -64000;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder().max_size(10).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open a single-connection pool on a private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool holds
    /// exactly one connection and never recycles it.
    pub fn in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open a pool for the given location
    pub fn open(location: &DatabaseLocation) -> DbResult<Self> {
        match location {
            DatabaseLocation::File(path) => Self::new(path),
            DatabaseLocation::Memory => Self::in_memory(),
        }
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure with a mutable database connection (for transactions)
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_keeps_state_between_checkouts() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute("CREATE TABLE t (x INTEGER)", [])?;
            conn.execute("INSERT INTO t (x) VALUES (7)", [])?;
            Ok(())
        })
        .unwrap();

        let x: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT x FROM t", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fit.db");
        let db = Database::open(&DatabaseLocation::File(path.clone())).unwrap();
        db.with_conn(|conn| Ok(conn.execute_batch("SELECT 1")?)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(DatabaseLocation::Memory.to_string(), ":memory:");
        assert_eq!(
            DatabaseLocation::File(PathBuf::from("data/fit.db")).to_string(),
            "data/fit.db"
        );
    }
}
