mod helpers;

use mcai::db;
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("cache.db");

    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();

    assert!(db_path.exists());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn open_enables_wal_and_busy_timeout() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("cache.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    let timeout: i64 = conn
        .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, db::BUSY_TIMEOUT_MS as i64);
}

#[test]
fn reopening_existing_db_is_safe() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cache.db");

    {
        let conn = db::open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO cache_entries (key, value, source, created_at, expires_at)
             VALUES ('knowledge:abc', '{}', 'builtin', '2026-01-01T00:00:00Z', 0)",
            [],
        )
        .unwrap();
    }

    let conn = db::open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn health_check_passes_on_valid_db() {
    let conn = helpers::test_db();

    let report = db::check_database_health(&conn).unwrap();
    assert!(report.integrity_ok);
    assert_eq!(report.schema_version, db::migrations::CURRENT_SCHEMA_VERSION);
    assert_eq!(report.entry_count, 0);
    assert_eq!(report.expired_count, 0);
}

#[test]
fn health_check_counts_expired_rows() {
    let conn = helpers::test_db();
    conn.execute(
        "INSERT INTO cache_entries (key, value, source, created_at, expires_at)
         VALUES ('knowledge:old', '{}', 'llm', '2020-01-01T00:00:00Z', 1)",
        [],
    )
    .unwrap();

    let report = db::check_database_health(&conn).unwrap();
    assert_eq!(report.entry_count, 1);
    assert_eq!(report.expired_count, 1);
}

#[test]
fn reopen_flushes_entries_written_under_another_key_namespace() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cache.db");

    {
        let conn = db::open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO cache_entries (key, value, source, created_at, expires_at)
             VALUES ('answers:abc', '{}', 'builtin', '2026-01-01T00:00:00Z', 9999999999999)",
            [],
        )
        .unwrap();
        conn.execute(
            "UPDATE schema_meta SET value = 'answers' WHERE key = 'key_namespace'",
            [],
        )
        .unwrap();
    }

    let conn = db::open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(
        db::migrations::get_key_namespace(&conn).unwrap().as_deref(),
        Some(mcai::cache::KNOWLEDGE_NAMESPACE)
    );
}
