//! Report repository implementation

use chrono::{Days, NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::models::{Report, SyncState};

/// Watermark key for reports in the `sync_watermarks` table
const WATERMARK_ENTITY: &str = "report";

const REPORT_COLUMNS: &str =
    "local_id, server_id, user_id, activity_id, start, stop, comment, seq, sync_state";

/// Trait for report storage operations
pub trait ReportRepository {
    /// Insert a new report, returning the assigned local id
    fn insert(&self, report: &Report) -> Result<i64>;

    /// Update an existing report; the report must carry a local id
    fn update(&self, report: &Report) -> Result<()>;

    /// Get a report by local id
    fn get(&self, local_id: i64) -> Result<Option<Report>>;

    /// Get a report by its remote id
    fn find_by_server_id(&self, server_id: i64) -> Result<Option<Report>>;

    /// Reports whose start falls on the given day, ordered by start
    fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Report>>;

    /// Rows awaiting remote tombstoning (known to the server)
    fn pending_deletes(&self) -> Result<Vec<Report>>;

    /// Rows that exist only locally and must be pushed as creations
    fn unsent(&self) -> Result<Vec<Report>>;

    /// Rows with unpushed local edits
    fn dirty(&self) -> Result<Vec<Report>>;

    /// Record the server-assigned id after a successful creation push
    fn set_server_id(&self, local_id: i64, server_id: i64) -> Result<()>;

    /// Transition a row's sync state
    fn set_state(&self, local_id: i64, state: SyncState) -> Result<()>;

    /// Physically delete a row, returning the number of rows removed
    fn delete(&self, local_id: i64) -> Result<usize>;

    /// Rows not yet fully reconciled with the server
    fn unsynced_count(&self) -> Result<i64>;

    /// Highest server sequence number incorporated so far
    fn watermark(&self) -> Result<i64>;

    /// Persist a new watermark; never decreases the stored value
    fn set_watermark(&self, seq: i64) -> Result<()>;
}

/// `SQLite` implementation of `ReportRepository`
pub struct SqliteReportRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteReportRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<Report> {
        let state: String = row.get(8)?;
        Ok(Report {
            local_id: row.get(0)?,
            server_id: row.get(1)?,
            user_id: row.get(2)?,
            activity_id: row.get(3)?,
            start: row.get(4)?,
            stop: row.get(5)?,
            comment: row.get(6)?,
            seq: row.get(7)?,
            state: SyncState::parse(&state).unwrap_or_default(),
        })
    }

    fn list_where(&self, filter: &str) -> Result<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports {filter} ORDER BY local_id ASC"
        ))?;

        let reports = stmt
            .query_map([], Self::parse_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn insert(&self, report: &Report) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO reports
                 (server_id, user_id, activity_id, start, stop, comment, seq, sync_state)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                report.server_id,
                report.user_id,
                report.activity_id,
                report.start,
                report.stop,
                report.comment,
                report.seq,
                report.state.as_str()
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, report: &Report) -> Result<()> {
        let Some(local_id) = report.local_id else {
            return Err(Error::InvalidInput(
                "cannot update a report without a local id".to_string(),
            ));
        };

        let rows = self.conn.execute(
            "UPDATE reports
             SET server_id = ?, user_id = ?, activity_id = ?, start = ?, stop = ?,
                 comment = ?, seq = ?, sync_state = ?
             WHERE local_id = ?",
            params![
                report.server_id,
                report.user_id,
                report.activity_id,
                report.start,
                report.stop,
                report.comment,
                report.seq,
                report.state.as_str(),
                local_id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("report {local_id}")));
        }

        Ok(())
    }

    fn get(&self, local_id: i64) -> Result<Option<Report>> {
        let report = self
            .conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE local_id = ?"),
                params![local_id],
                Self::parse_report,
            )
            .optional()?;

        Ok(report)
    }

    fn find_by_server_id(&self, server_id: i64) -> Result<Option<Report>> {
        let report = self
            .conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE server_id = ?"),
                params![server_id],
                Self::parse_report,
            )
            .optional()?;

        Ok(report)
    }

    fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Report>> {
        let from = day.and_time(NaiveTime::MIN).and_utc();
        let to = day
            .checked_add_days(Days::new(1))
            .unwrap_or(day)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS}
             FROM reports
             WHERE start >= ? AND start < ? AND sync_state != 'pending_delete'
             ORDER BY start ASC"
        ))?;

        let reports = stmt
            .query_map(params![from, to], Self::parse_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }

    fn pending_deletes(&self) -> Result<Vec<Report>> {
        self.list_where("WHERE sync_state = 'pending_delete' AND server_id IS NOT NULL")
    }

    fn unsent(&self) -> Result<Vec<Report>> {
        self.list_where("WHERE server_id IS NULL")
    }

    fn dirty(&self) -> Result<Vec<Report>> {
        self.list_where("WHERE sync_state = 'dirty' AND server_id IS NOT NULL")
    }

    fn set_server_id(&self, local_id: i64, server_id: i64) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE reports SET server_id = ? WHERE local_id = ?",
            params![server_id, local_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("report {local_id}")));
        }

        Ok(())
    }

    fn set_state(&self, local_id: i64, state: SyncState) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE reports SET sync_state = ? WHERE local_id = ?",
            params![state.as_str(), local_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(format!("report {local_id}")));
        }

        Ok(())
    }

    fn delete(&self, local_id: i64) -> Result<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM reports WHERE local_id = ?", params![local_id])?;
        Ok(rows)
    }

    fn unsynced_count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM reports
             WHERE server_id IS NULL OR sync_state != 'clean'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn watermark(&self) -> Result<i64> {
        // The dedicated record survives tombstone deletions; MAX(seq) covers
        // stores written before the record existed.
        let stored: i64 = self.conn.query_row(
            "SELECT COALESCE(
                 (SELECT watermark FROM sync_watermarks WHERE entity = ?),
                 0
             )",
            params![WATERMARK_ENTITY],
            |row| row.get(0),
        )?;

        let max_seq: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(seq), 0) FROM reports",
            [],
            |row| row.get(0),
        )?;

        Ok(stored.max(max_seq))
    }

    fn set_watermark(&self, seq: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_watermarks (entity, watermark) VALUES (?, ?)
             ON CONFLICT(entity) DO UPDATE SET
                 watermark = MAX(watermark, excluded.watermark)",
            params![WATERMARK_ENTITY, seq],
        )?;

        Ok(())
    }
}
