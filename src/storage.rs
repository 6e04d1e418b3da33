use std::path::Path;

use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::{Error, Result};
use crate::migrate;

/// Read-only port into the store. Holding one of these cannot start a write
/// transaction anywhere in this crate.
#[derive(Clone)]
pub struct ReadHandle(pub(crate) SqlitePool);

/// Read-write port. The pool behind it has a single connection, so writes
/// are serialized by construction.
#[derive(Clone)]
pub struct WriteHandle(pub(crate) SqlitePool);

/// The storage layer. All entity operations hang off this struct; see the
/// per-entity modules.
pub struct Storage {
    pub(crate) read: ReadHandle,
    pub(crate) write: WriteHandle,
}

impl Storage {
    /// Opens (creating if needed) the database at `path`, applies pending
    /// migrations on the write handle, and opens a separate read-only pool
    /// so read traffic is never queued behind a write transaction.
    pub async fn open(path: &Path) -> Result<Self> {
        let rw = db::open_write_pool(path).await?;
        migrate::apply_migrations(&rw)
            .await
            .map_err(Error::Migration)?;
        let ro = db::open_read_pool(path).await?;
        info!(target = "evevault", event = "storage_open", path = %path.display());
        Ok(Self {
            read: ReadHandle(ro),
            write: WriteHandle(rw),
        })
    }

    /// In-memory store for tests and ephemeral sessions. Both handles share
    /// one single-connection pool; the read/write split stays intact at the
    /// type level.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = db::open_memory_pool().await?;
        migrate::apply_migrations(&pool)
            .await
            .map_err(Error::Migration)?;
        Ok(Self {
            read: ReadHandle(pool.clone()),
            write: WriteHandle(pool),
        })
    }

    pub(crate) fn reader(&self) -> &SqlitePool {
        &self.read.0
    }

    pub(crate) fn writer(&self) -> &SqlitePool {
        &self.write.0
    }

    pub async fn close(self) {
        self.write.0.close().await;
        if !self.read.0.is_closed() {
            self.read.0.close().await;
        }
    }
}

/// Rejects zero-valued mandatory identifiers before any database call.
pub(crate) fn require_id(op: &'static str, field: &'static str, value: i64) -> Result<()> {
    if value == 0 {
        Err(Error::InvalidArgument(format!(
            "{op}: {field} must not be zero"
        )))
    } else {
        Ok(())
    }
}

pub(crate) fn require_str(op: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::InvalidArgument(format!(
            "{op}: {field} must not be empty"
        )))
    } else {
        Ok(())
    }
}
