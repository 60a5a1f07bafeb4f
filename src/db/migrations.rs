//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`].

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Get the key namespace the cache was written with, if recorded.
pub fn get_key_namespace(conn: &Connection) -> rusqlite::Result<Option<String>> {
    match conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'key_namespace'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Run any pending forward-only migrations. Each migration runs in a transaction.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        let tx = conn.unchecked_transaction()?;
        match next {
            2 => migrate_v1_to_v2(&tx)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }
        update_schema_version(&tx, next)?;
        tx.commit()?;
        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: record the cache key namespace. See [`reconcile_key_namespace`].
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('key_namespace', ?1)",
        [crate::cache::KNOWLEDGE_NAMESPACE],
    )?;
    Ok(())
}

/// Flush every cached answer when the stored key namespace differs from
/// `namespace`, then record `namespace`. Keys written under another format
/// can never be hit again. Returns the number of rows removed.
pub fn reconcile_key_namespace(conn: &Connection, namespace: &str) -> rusqlite::Result<usize> {
    let stored = get_key_namespace(conn)?;
    if stored.as_deref() == Some(namespace) {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute("DELETE FROM cache_entries", [])?;
    tx.execute(
        "INSERT INTO schema_meta (key, value) VALUES ('key_namespace', ?1) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [namespace],
    )?;
    tx.commit()?;

    tracing::warn!(
        stored = stored.as_deref().unwrap_or("(none)"),
        current = namespace,
        removed,
        "cache key namespace changed, cache flushed"
    );
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn get_schema_version_returns_1_on_fresh_db() {
        let conn = test_db();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn run_migrations_upgrades_to_current() {
        let conn = test_db();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn migration_v1_to_v2_records_namespace() {
        let conn = test_db();
        assert!(get_key_namespace(&conn).unwrap().is_none());

        run_migrations(&conn).unwrap();

        assert_eq!(
            get_key_namespace(&conn).unwrap(),
            Some(crate::cache::KNOWLEDGE_NAMESPACE.to_string())
        );
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = test_db();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }
}
