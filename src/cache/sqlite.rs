//! Cache store in a SQLite file shared by all worker processes.
//!
//! Each process holds its own connection behind a mutex. Cross-process
//! safety comes from SQLite's own locking (WAL + busy timeout).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{CacheEntry, CacheStats, CacheStore, CachedAnswer};

pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    /// Open (or create) the cache file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = crate::db::open_database(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap a connection whose schema is already initialized.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let conn = self.lock()?;
        let now_ms = Utc::now().timestamp_millis();

        let row = conn
            .query_row(
                "SELECT value, created_at, expires_at FROM cache_entries \
                 WHERE key = ?1 AND expires_at > ?2",
                params![key, now_ms],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((value_json, created_at, expires_at_ms)) = row else {
            return Ok(None);
        };

        let value: CachedAnswer =
            serde_json::from_str(&value_json).context("corrupt cache value")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .context("corrupt cache timestamp")?
            .with_timezone(&Utc);
        let ttl_ms = (expires_at_ms - created_at.timestamp_millis()).max(0) as u64;

        Ok(Some(CacheEntry::created_at(
            key.to_string(),
            value,
            Duration::from_millis(ttl_ms),
            created_at,
        )))
    }

    fn put(&self, entry: CacheEntry) -> Result<()> {
        let value_json = serde_json::to_string(&entry.value)?;
        let expires_at_ms = entry.expires_at().timestamp_millis();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO cache_entries (key, value, source, created_at, expires_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, source = excluded.source, \
             created_at = excluded.created_at, expires_at = excluded.expires_at",
            params![
                entry.key,
                value_json,
                entry.source.as_str(),
                entry.created_at.to_rfc3339(),
                expires_at_ms,
            ],
        )?;
        Ok(())
    }

    fn invalidate(&self, prefix: Option<&str>) -> Result<usize> {
        let conn = self.lock()?;
        // Case-sensitive prefix match; LIKE folds ASCII case.
        let removed = match prefix {
            Some(prefix) => conn.execute(
                "DELETE FROM cache_entries WHERE substr(key, 1, length(?1)) = ?1",
                [prefix],
            )?,
            None => conn.execute("DELETE FROM cache_entries", [])?,
        };
        tracing::info!(removed, prefix = prefix.unwrap_or("*"), "cache invalidated");
        Ok(removed)
    }

    fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE expires_at <= ?1",
            [Utc::now().timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;
        let now_ms = Utc::now().timestamp_millis();

        let entries: i64 =
            conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        let expired: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE expires_at <= ?1",
            [now_ms],
            |row| row.get(0),
        )?;

        let mut stmt =
            conn.prepare("SELECT source, COUNT(*) FROM cache_entries GROUP BY source")?;
        let by_source: HashMap<String, usize> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<_, _>>()?;

        Ok(CacheStats {
            entries: entries as usize,
            expired: expired as usize,
            by_source,
        })
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
