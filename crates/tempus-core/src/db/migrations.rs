//! Database migrations

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get::<_, i32>(0).map(|flag| flag != 0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Migration to version 1: Initial schema
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY
         );
         -- Read-only mirror of the server's activity table
         CREATE TABLE IF NOT EXISTS activities (
             local_id INTEGER PRIMARY KEY AUTOINCREMENT,
             server_id INTEGER NOT NULL UNIQUE,
             name TEXT NOT NULL,
             description TEXT NOT NULL DEFAULT '',
             active INTEGER NOT NULL DEFAULT 1
         );
         CREATE INDEX IF NOT EXISTS idx_activities_name ON activities(name);
         -- Time entries; sync_state is one of 'clean', 'dirty', 'pending_delete'
         CREATE TABLE IF NOT EXISTS reports (
             local_id INTEGER PRIMARY KEY AUTOINCREMENT,
             server_id INTEGER UNIQUE,
             user_id INTEGER NOT NULL DEFAULT -1,
             activity_id INTEGER NOT NULL,
             start TEXT NOT NULL,
             stop TEXT NOT NULL,
             comment TEXT NOT NULL DEFAULT '',
             seq INTEGER,
             sync_state TEXT NOT NULL DEFAULT 'clean'
         );
         CREATE INDEX IF NOT EXISTS idx_reports_start ON reports(start);
         CREATE INDEX IF NOT EXISTS idx_reports_sync_state ON reports(sync_state);
         CREATE INDEX IF NOT EXISTS idx_reports_seq ON reports(seq DESC);
         -- Highest server sequence number incorporated, per entity kind
         CREATE TABLE IF NOT EXISTS sync_watermarks (
             entity TEXT PRIMARY KEY,
             watermark INTEGER NOT NULL
         );
         INSERT INTO schema_version (version) VALUES (1);
         COMMIT;",
    )?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
