//! SQLite backing for the shared answer cache.
//!
//! Every worker process opens the same file; WAL mode plus a busy timeout lets
//! readers and the occasional writer proceed without coordinating in-process.

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Milliseconds SQLite waits on a locked database before giving up.
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open (or create) the cache database at the given path with schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    migrations::reconcile_key_namespace(&conn, crate::cache::KNOWLEDGE_NAMESPACE)
        .context("failed to check cache key namespace")?;

    tracing::info!(path = %path.display(), "cache database initialized");
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    migrations::reconcile_key_namespace(&conn, crate::cache::KNOWLEDGE_NAMESPACE)
        .context("failed to check cache key namespace")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug)]
pub struct HealthReport {
    pub schema_version: u32,
    pub entry_count: u64,
    pub expired_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run integrity and row-count checks against an open cache database.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;

    let entry_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
    let expired_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cache_entries WHERE expires_at <= ?1",
        [chrono::Utc::now().timestamp_millis()],
        |row| row.get(0),
    )?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    Ok(HealthReport {
        schema_version,
        entry_count: entry_count as u64,
        expired_count: expired_count as u64,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}
