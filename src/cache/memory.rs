//! In-process cache store backed by a mutex-guarded map.

use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{CacheEntry, CacheStats, CacheStore};

#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("cache lock poisoned: {e}"))
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self.lock()?;
        let now = Utc::now();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .cloned())
    }

    fn put(&self, entry: CacheEntry) -> Result<()> {
        self.lock()?.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn invalidate(&self, prefix: Option<&str>) -> Result<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        match prefix {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => entries.clear(),
        }
        Ok(before - entries.len())
    }

    fn purge_expired(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }

    fn stats(&self) -> Result<CacheStats> {
        let entries = self.lock()?;
        let now = Utc::now();
        let mut stats = CacheStats {
            entries: entries.len(),
            ..Default::default()
        };
        for entry in entries.values() {
            if entry.is_expired_at(now) {
                stats.expired += 1;
            }
            *stats
                .by_source
                .entry(entry.source.as_str().to_string())
                .or_insert(0) += 1;
        }
        Ok(stats)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
