mod helpers;

use chrono::{Duration as ChronoDuration, Utc};
use mcai::cache::memory::MemoryCacheStore;
use mcai::cache::sqlite::SqliteCacheStore;
use mcai::cache::{cache_key, CacheEntry, CacheStore, CachedAnswer, SharedCache, TtlPolicy, KNOWLEDGE_NAMESPACE};
use mcai::knowledge::SourceKind;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn answer(text: &str, source: SourceKind) -> CachedAnswer {
    CachedAnswer {
        text: text.into(),
        source,
    }
}

fn stores() -> Vec<Arc<dyn CacheStore>> {
    vec![
        Arc::new(MemoryCacheStore::new()),
        Arc::new(SqliteCacheStore::from_connection(helpers::test_db())),
    ]
}

#[test]
fn put_then_get_is_idempotent() {
    for store in stores() {
        let cache = SharedCache::new(store, TtlPolicy::default());
        let value = answer("Rayleigh scattering.", SourceKind::Builtin);
        cache.put_answer("Why is the sky blue?", &value).unwrap();

        for _ in 0..3 {
            assert_eq!(cache.get("Why is the sky blue?").unwrap(), Some(value.clone()));
        }
        // Case and whitespace variants share the key.
        assert_eq!(cache.get("  why IS the sky   blue?").unwrap(), Some(value.clone()));
    }
}

#[test]
fn expired_entries_are_misses() {
    for store in stores() {
        let key = cache_key(KNOWLEDGE_NAMESPACE, "what is dna?");
        let entry = CacheEntry::created_at(
            key.clone(),
            answer("old", SourceKind::Llm),
            Duration::from_secs(3600),
            Utc::now() - ChronoDuration::hours(2),
        );
        store.put(entry).unwrap();

        assert!(store.get(&key).unwrap().is_none(), "{}", store.backend());
        assert_eq!(store.stats().unwrap().expired, 1);
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.stats().unwrap().entries, 0);
    }
}

#[test]
fn later_put_replaces_earlier() {
    for store in stores() {
        let cache = SharedCache::new(store, TtlPolicy::default());
        cache.put_answer("q", &answer("first", SourceKind::Dataset)).unwrap();
        cache.put_answer("q", &answer("second", SourceKind::Llm)).unwrap();

        assert_eq!(cache.get("q").unwrap().unwrap().text, "second");
        assert_eq!(cache.stats().unwrap().entries, 1);
    }
}

#[test]
fn invalidate_by_query_prefix_and_all() {
    for store in stores() {
        let cache = SharedCache::new(store, TtlPolicy::default());
        for q in ["one", "two", "three"] {
            cache.put_answer(q, &answer(q, SourceKind::Builtin)).unwrap();
        }

        assert_eq!(cache.invalidate_query("two").unwrap(), 1);
        assert!(cache.get("two").unwrap().is_none());

        assert_eq!(cache.invalidate(Some("other:")).unwrap(), 0);
        assert_eq!(cache.invalidate(Some("KNOWLEDGE:")).unwrap(), 0, "{}", cache.backend());
        assert_eq!(cache.invalidate(Some("knowledge:")).unwrap(), 2);
        assert_eq!(cache.stats().unwrap().entries, 0);

        cache.put_answer("four", &answer("four", SourceKind::Builtin)).unwrap();
        assert_eq!(cache.invalidate(None).unwrap(), 1);
    }
}

#[test]
fn sqlite_cache_is_shared_between_connections() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cache.db");

    let worker_a = SharedCache::new(
        Arc::new(SqliteCacheStore::open(&path).unwrap()),
        TtlPolicy::default(),
    );
    let worker_b = SharedCache::new(
        Arc::new(SqliteCacheStore::open(&path).unwrap()),
        TtlPolicy::default(),
    );

    let value = answer("Water droplets and ice crystals.", SourceKind::Dataset);
    worker_a.put_answer("What are clouds made of?", &value).unwrap();

    assert_eq!(worker_b.get("what are clouds made of?").unwrap(), Some(value));

    assert_eq!(worker_b.invalidate(None).unwrap(), 1);
    assert!(worker_a.get("What are clouds made of?").unwrap().is_none());
}

#[test]
fn stats_group_by_source() {
    for store in stores() {
        let cache = SharedCache::new(store, TtlPolicy::default());
        cache.put_answer("a", &answer("a", SourceKind::Llm)).unwrap();
        cache.put_answer("b", &answer("b", SourceKind::Llm)).unwrap();
        cache.put_answer("c", &answer("c", SourceKind::Encyclopedia)).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.by_source.get("llm"), Some(&2));
        assert_eq!(stats.by_source.get("encyclopedia"), Some(&1));
    }
}
