//! Key/value cache with optional expiry, used for upstream API responses.

use sqlx::Row;
use tracing::debug;

use crate::error::{map_db_err, map_get_err, Error, Result};
use crate::storage::{require_str, Storage};
use crate::time::now_ms;

#[derive(Debug, Clone, Default)]
pub struct CacheSetParams {
    pub key: String,
    pub value: Vec<u8>,
    /// `None` means the entry never expires.
    pub expires_at: Option<i64>,
}

impl Storage {
    pub async fn cache_set(&self, arg: CacheSetParams) -> Result<()> {
        require_str("cache set", "key", &arg.key)?;
        sqlx::query(
            "INSERT INTO cache (key, value, expires_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        )
        .bind(&arg.key)
        .bind(&arg.value)
        .bind(arg.expires_at)
        .execute(self.writer())
        .await
        .map_err(map_db_err("cache set"))?;
        debug!(target = "evevault", event = "cache_set", key = %arg.key);
        Ok(())
    }

    /// Returns the stored value. Expired entries are treated as absent.
    pub async fn cache_get(&self, key: &str) -> Result<Vec<u8>> {
        require_str("cache get", "key", key)?;
        let row = sqlx::query("SELECT value, expires_at FROM cache WHERE key = ?")
            .bind(key)
            .fetch_one(self.reader())
            .await
            .map_err(map_get_err("cache get"))?;
        let expires_at: Option<i64> = row.get("expires_at");
        if is_expired(expires_at) {
            return Err(Error::NotFound);
        }
        Ok(row.get("value"))
    }

    pub async fn cache_exists(&self, key: &str) -> Result<bool> {
        require_str("cache exists", "key", key)?;
        let expires_at: Option<Option<i64>> =
            sqlx::query_scalar("SELECT expires_at FROM cache WHERE key = ?")
                .bind(key)
                .fetch_optional(self.reader())
                .await
                .map_err(map_db_err("cache exists"))?;
        Ok(match expires_at {
            None => false,
            Some(expiry) => !is_expired(expiry),
        })
    }

    pub async fn cache_delete(&self, key: &str) -> Result<()> {
        require_str("cache delete", "key", key)?;
        sqlx::query("DELETE FROM cache WHERE key = ?")
            .bind(key)
            .execute(self.writer())
            .await
            .map_err(map_db_err("cache delete"))?;
        Ok(())
    }

    pub async fn cache_clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM cache")
            .execute(self.writer())
            .await
            .map_err(map_db_err("cache clear"))?;
        Ok(())
    }

    /// Deletes all expired entries and reports how many were removed.
    pub async fn cache_cleanup(&self) -> Result<u64> {
        let res = sqlx::query("DELETE FROM cache WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(now_ms())
            .execute(self.writer())
            .await
            .map_err(map_db_err("cache cleanup"))?;
        let n = res.rows_affected();
        debug!(target = "evevault", event = "cache_cleanup", removed = n);
        Ok(n)
    }
}

fn is_expired(expires_at: Option<i64>) -> bool {
    match expires_at {
        None => false,
        Some(at) => at <= now_ms(),
    }
}
