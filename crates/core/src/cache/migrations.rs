//! Schema migrations for the cache database.
//!
//! Applied versions are recorded in `_migrations`. Each pending migration runs
//! in its own transaction together with its bookkeeping row.

use super::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "cache_stores", sql: include_str!("../../migrations/001_cache_stores.sql") },
    Migration { version: 2, name: "cache_entries", sql: include_str!("../../migrations/002_cache_entries.sql") },
];

/// Bring the schema up to the latest version.
///
/// # Errors
///
/// `Error::MigrationFailed` names the version whose SQL was rejected; nothing
/// from that version is kept.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current: i64 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql).map_err(|e| failed(migration, &e))?;
            tx.execute(
                "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit().map_err(|e| failed(migration, &e))?;
            tracing::debug!(version = migration.version, name = migration.name, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

fn failed(migration: &Migration, err: &rusqlite::Error) -> Error {
    Error::MigrationFailed(format!("{} ({}): {err}", migration.version, migration.name))
}
