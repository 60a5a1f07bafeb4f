//! Shared answer cache.
//!
//! [`SharedCache`] derives a fixed-length key from a query (lowercase,
//! whitespace-collapsed, SHA-256) and delegates storage to a [`CacheStore`].
//! Two stores ship: [`sqlite::SqliteCacheStore`], a file shared by every worker
//! process, and [`memory::MemoryCacheStore`] for tests and single-process runs.
//!
//! The cache is an optimization only. Callers treat any store error as a miss.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::knowledge::SourceKind;

/// Key namespace for fallback-chain results.
pub const KNOWLEDGE_NAMESPACE: &str = "knowledge";

/// The cached payload: answer text plus the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub text: String,
    pub source: SourceKind,
}

/// One row of the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: CachedAnswer,
    pub source: SourceKind,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Build an entry stamped with the current time.
    pub fn new(key: String, value: CachedAnswer, ttl: Duration) -> Self {
        Self::created_at(key, value, ttl, Utc::now())
    }

    pub fn created_at(
        key: String,
        value: CachedAnswer,
        ttl: Duration,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            source: value.source,
            value,
            created_at,
            ttl,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        self.created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Counts reported by [`CacheStore::stats`].
#[derive(Debug, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub expired: usize,
    pub by_source: HashMap<String, usize>,
}

/// A key-value store with per-entry expiry.
///
/// Operations are independent per key. Writes are upserts, so concurrent
/// writers racing on one key leave whichever value landed last.
pub trait CacheStore: Send + Sync {
    /// Return the live entry for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or replace the entry for `entry.key`.
    fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Remove entries whose key starts with `prefix`, or every entry when `None`.
    /// Returns the number removed.
    fn invalidate(&self, prefix: Option<&str>) -> Result<usize>;

    /// Remove expired entries. Returns the number removed.
    fn purge_expired(&self) -> Result<usize>;

    fn stats(&self) -> Result<CacheStats>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Entry lifetimes per source class.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    /// Curated, dataset and encyclopedia answers.
    pub document: Duration,
    /// LLM and web-search answers.
    pub live: Duration,
}

impl TtlPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            document: Duration::from_secs(config.document_ttl_secs),
            live: Duration::from_secs(config.live_ttl_secs),
        }
    }

    pub fn ttl_for(&self, source: SourceKind) -> Duration {
        if source.is_live() {
            self.live
        } else {
            self.document
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Lowercase and collapse runs of whitespace. No other normalization.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"<namespace>:<hex sha256 of the normalized query>"`
pub fn cache_key(namespace: &str, query: &str) -> String {
    let digest = Sha256::digest(normalize_query(query).as_bytes());
    format!("{namespace}:{}", hex::encode(digest))
}

/// Query-keyed facade over a [`CacheStore`].
#[derive(Clone)]
pub struct SharedCache {
    store: Arc<dyn CacheStore>,
    ttl: TtlPolicy,
}

impl SharedCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: TtlPolicy) -> Self {
        Self { store, ttl }
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        self.ttl
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn get(&self, query: &str) -> Result<Option<CachedAnswer>> {
        let key = cache_key(KNOWLEDGE_NAMESPACE, query);
        Ok(self.store.get(&key)?.map(|entry| entry.value))
    }

    pub fn put(&self, query: &str, value: &CachedAnswer, ttl: Duration) -> Result<()> {
        let key = cache_key(KNOWLEDGE_NAMESPACE, query);
        self.store.put(CacheEntry::new(key, value.clone(), ttl))
    }

    /// Store `value` with the lifetime its source class gets under the policy.
    pub fn put_answer(&self, query: &str, value: &CachedAnswer) -> Result<()> {
        self.put(query, value, self.ttl.ttl_for(value.source))
    }

    pub fn invalidate(&self, prefix: Option<&str>) -> Result<usize> {
        self.store.invalidate(prefix)
    }

    /// Drop the cached answer for one query.
    pub fn invalidate_query(&self, query: &str) -> Result<usize> {
        self.store
            .invalidate(Some(&cache_key(KNOWLEDGE_NAMESPACE, query)))
    }

    pub fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired()
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.store.stats()
    }
}

/// Build the cache configured by `[cache]`. `None` when the backend is `"none"`.
pub fn create_cache(config: &crate::config::McaiConfig) -> Result<Option<SharedCache>> {
    let ttl = TtlPolicy::from_config(&config.cache);
    let store: Arc<dyn CacheStore> = match config.cache.backend.as_str() {
        "sqlite" => Arc::new(sqlite::SqliteCacheStore::open(config.resolved_cache_path())?),
        "memory" => Arc::new(memory::MemoryCacheStore::new()),
        "none" => return Ok(None),
        other => anyhow::bail!("unknown cache backend: {other}. Supported: sqlite, memory, none"),
    };
    tracing::info!(backend = store.backend(), "answer cache ready");
    Ok(Some(SharedCache::new(store, ttl)))
}
