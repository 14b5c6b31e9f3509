use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Latest schema version this build knows how to create.
pub const SCHEMA_VERSION: i64 = 2;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

// Additive only: never drop or alter a partition in place.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "emotions and chat partitions",
        sql: "
            CREATE TABLE IF NOT EXISTS emotions (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                data    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                data    TEXT NOT NULL
            );
        ",
    },
    Migration {
        version: 2,
        name: "share key ledger",
        sql: "
            CREATE TABLE IF NOT EXISTS used_share_keys (
                key         TEXT PRIMARY KEY,
                used        INTEGER NOT NULL DEFAULT 0,
                used_at     TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_used_share_keys_used
                ON used_share_keys(used);

            CREATE INDEX IF NOT EXISTS idx_used_share_keys_used_at
                ON used_share_keys(used_at);
        ",
    },
];

/// Schema version recorded in the database, 0 for a fresh file.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
    )?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Bring the schema from its stored version up to `target`, one step per
/// transaction, in version order. A database already at or past `target`
/// is left untouched.
pub fn run(conn: &mut Connection, target: i64) -> Result<i64> {
    if !(0..=SCHEMA_VERSION).contains(&target) {
        return Err(StoreError::UnknownSchemaVersion(target));
    }

    let stored = current_version(conn)?;
    if stored >= target {
        info!("Database schema at v{} (target v{}), nothing to migrate", stored, target);
        return Ok(stored);
    }

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > stored && m.version <= target)
    {
        info!("Running migration v{} ({})", migration.version, migration.name);
        let tx = conn.transaction()?;
        apply(&tx, migration)?;
        tx.commit()?;
    }

    info!("Database migrations complete");
    Ok(target)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch(migration.sql)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [migration.version],
    )?;
    Ok(())
}
