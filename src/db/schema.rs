//! Database schema and migrations

use rusqlite::Connection;

use crate::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
///
/// # Errors
///
/// Returns error if migration fails
pub fn init(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        -- Finalized cases: identifiers plus the classification service's
        -- response fields, stored verbatim as JSON
        CREATE TABLE IF NOT EXISTS cases (
            case_id TEXT PRIMARY KEY,
            lawyer_id TEXT NOT NULL,
            judge_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            classification TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_cases_lawyer ON cases(lawyer_id);
        CREATE INDEX IF NOT EXISTS idx_cases_user ON cases(user_id);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}
