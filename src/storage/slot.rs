//! Connection slot shared by the SQLite-backed stores
//!
//! Holds the pool once connected. All SQLite work runs on the blocking pool.

use tokio::sync::RwLock;
use tracing::info;

use super::{StorageError, StorageResult};
use crate::db::migrations::run_migrations;
use crate::db::{Database, DatabaseLocation, DbResult};

pub(crate) struct ConnectionSlot {
    location: DatabaseLocation,
    database: RwLock<Option<Database>>,
}

impl ConnectionSlot {
    pub fn new(location: DatabaseLocation) -> Self {
        Self {
            location,
            database: RwLock::new(None),
        }
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// Open the pool, migrate, then run `bootstrap`. Returns `false` when
    /// already connected, in which case `bootstrap` is not run.
    pub async fn connect<F>(&self, bootstrap: F) -> StorageResult<bool>
    where
        F: FnOnce(&Database) -> StorageResult<()> + Send + 'static,
    {
        // Held until the pool is stored so concurrent connects open it once
        let mut slot = self.database.write().await;
        if slot.is_some() {
            return Ok(false);
        }

        let location = self.location.clone();
        let database = tokio::task::spawn_blocking(move || -> StorageResult<Database> {
            let database = Database::open(&location)?;
            database.with_conn(run_migrations)?;
            bootstrap(&database)?;
            Ok(database)
        })
        .await??;

        info!("Connected to {}", self.location);
        *slot = Some(database);
        Ok(true)
    }

    /// Drop the pool. Returns `false` when there was nothing to drop.
    pub async fn disconnect(&self) -> bool {
        self.database.write().await.take().is_some()
    }

    pub async fn is_connected(&self) -> bool {
        self.database.read().await.is_some()
    }

    pub async fn database(&self) -> StorageResult<Database> {
        self.database
            .read()
            .await
            .clone()
            .ok_or(StorageError::NotConnected)
    }

    /// Run `f` against the pool on the blocking thread pool
    pub async fn run<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Database) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let database = self.database().await?;
        tokio::task::spawn_blocking(move || f(&database)).await?
    }

    /// Run `f` with one pooled connection
    pub async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(move |db| Ok(db.with_conn(f)?)).await
    }
}
