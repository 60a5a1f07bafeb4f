//! CLI `cache` commands: stats, invalidate, purge.

use anyhow::Result;

use mcai::cache::{create_cache, SharedCache};
use mcai::config::McaiConfig;

fn open(config: &McaiConfig) -> Result<Option<SharedCache>> {
    let cache = create_cache(config)?;
    if cache.is_none() {
        println!("Cache is disabled (backend = \"none\").");
    }
    Ok(cache)
}

/// Display cache entry counts in the terminal.
pub fn stats(config: &McaiConfig) -> Result<()> {
    let Some(cache) = open(config)? else {
        return Ok(());
    };
    let stats = cache.stats()?;
    let ttl = cache.ttl_policy();

    println!("Cache Statistics");
    println!("{}", "=".repeat(40));
    println!("  Backend:             {}", cache.backend());
    if config.cache.backend == "sqlite" {
        println!("  Path:                {}", config.resolved_cache_path().display());
    }
    println!("  Entries:             {}", stats.entries);
    println!("  Expired:             {}", stats.expired);
    println!();

    println!("By Source:");
    for s in ["builtin", "llm", "dataset", "web_search", "encyclopedia"] {
        let count = stats.by_source.get(s).copied().unwrap_or(0);
        println!("  {:<14} {}", s, count);
    }
    println!();

    println!("TTL (document):        {}s", ttl.document.as_secs());
    println!("TTL (live):            {}s", ttl.live.as_secs());

    Ok(())
}

/// Remove cached answers: one query, a key prefix, or everything.
pub fn invalidate(config: &McaiConfig, prefix: Option<&str>, query: Option<&str>) -> Result<()> {
    let Some(cache) = open(config)? else {
        return Ok(());
    };

    let removed = match query {
        Some(q) => cache.invalidate_query(q)?,
        None => cache.invalidate(prefix)?,
    };
    println!("Removed {removed} cache entr{}.", if removed == 1 { "y" } else { "ies" });
    Ok(())
}

/// Remove expired entries.
pub fn purge(config: &McaiConfig) -> Result<()> {
    let Some(cache) = open(config)? else {
        return Ok(());
    };
    let removed = cache.purge_expired()?;
    println!("Purged {removed} expired entr{}.", if removed == 1 { "y" } else { "ies" });
    Ok(())
}
