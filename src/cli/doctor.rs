//! CLI `doctor` command: check the cache database and configuration.

use anyhow::{Context, Result};

use mcai::config::McaiConfig;
use mcai::db;

/// Run cache diagnostics and print a health report.
pub fn doctor(config: &McaiConfig) -> Result<()> {
    println!("MC AI Health Report");
    println!("===================");
    println!();
    println!("Cache backend:     {}", config.cache.backend);
    println!("Dataset dir:       {}", config.resolved_dataset_dir().display());
    println!(
        "LLM key:           {} ({})",
        if config.llm_api_key().is_some() { "set" } else { "missing" },
        config.llm.api_key_env
    );
    println!();

    if config.cache.backend != "sqlite" {
        println!("Cache database:    not used");
        return Ok(());
    }

    let db_path = config.resolved_cache_path();
    if !db_path.exists() {
        println!("Cache database:    not found at {}", db_path.display());
        println!("Run `mcai serve` or `mcai ask` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Cache database:    {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Row counts:");
    println!("  Entries:         {}", report.entry_count);
    println!("  Expired:         {}", report.expired_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  The cache holds no source data. Delete the file and restart:");
        println!("     rm {}", db_path.display());
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
