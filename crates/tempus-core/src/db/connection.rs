//! Local store connection management
//!
//! Every `Database` owns exactly one `rusqlite::Connection`. Connections are
//! never shared across threads: the foreground manager opens one, and each
//! sync worker opens its own against the same file at thread start.

use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

use super::migrations;

/// Wrapper around a single local `SQLite` connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (and create if missing) a database at the given path.
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    /// Configure `SQLite` for concurrent foreground/worker access.
    fn configure(&self) -> Result<()> {
        // journal_mode returns a row, so query it instead of executing
        self.conn
            .query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        // Workers and the foreground contend briefly during a pull
        self.conn.pragma_update(None, "busy_timeout", 5000)?;
        Ok(())
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn)
    }

    /// Get a reference to the underlying connection.
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_in_memory_runs_migrations() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn open_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("tempus.db");
        let _db = Database::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn two_connections_see_the_same_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tempus.db");

        let writer = Database::open(&path).unwrap();
        writer
            .connection()
            .execute(
                "INSERT INTO activities (server_id, name, description, active)
                 VALUES (1, 'Dev', '', 1)",
                [],
            )
            .unwrap();

        let reader = Database::open(&path).unwrap();
        let count: i64 = reader
            .connection()
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
