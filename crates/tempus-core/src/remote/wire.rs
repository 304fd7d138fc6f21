//! Wire format for the sync REST surface
//!
//! The server speaks JSON rows wrapped in a `{"data": ...}` envelope. Rows
//! map to and from the local typed entities through the pure functions below;
//! no dynamic row dictionaries anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Activity, Report, SyncState};

/// Sentinel the server understands as "no id assigned yet"
pub const UNASSIGNED_ID: i64 = -1;

/// Envelope wrapping every response body
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Response body of a creation request
#[derive(Debug, Deserialize)]
pub struct CreatedRow {
    pub id: i64,
}

/// An activity row as the server sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub active: bool,
}

/// A report row as it travels over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Remote primary key; [`UNASSIGNED_ID`] on creation requests
    pub id: i64,
    pub user_id: i64,
    pub activity_id: i64,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
    /// Server-assigned modification sequence
    #[serde(default)]
    pub seq: i64,
    /// Tombstone marker; deletions travel as updates with this set
    #[serde(default)]
    pub deleted: bool,
}

/// Map a local report to its wire form.
///
/// The tombstone marker reflects the local `PendingDelete` state, so the
/// deletion push is a plain update call.
#[must_use]
pub fn report_to_wire(report: &Report) -> ReportRow {
    ReportRow {
        id: report.server_id.unwrap_or(UNASSIGNED_ID),
        user_id: report.user_id,
        activity_id: report.activity_id,
        start: report.start,
        stop: report.stop,
        comment: report.comment.clone(),
        seq: report.seq.unwrap_or(UNASSIGNED_ID),
        deleted: report.state == SyncState::PendingDelete,
    }
}

/// Map a pulled report row to a fresh local entity.
///
/// The result carries no local id; callers attach one when overwriting an
/// existing row. Pulled rows are authoritative, so the state is `Clean`.
#[must_use]
pub fn report_from_wire(row: &ReportRow) -> Report {
    Report {
        local_id: None,
        server_id: Some(row.id),
        user_id: row.user_id,
        activity_id: row.activity_id,
        start: row.start,
        stop: row.stop,
        comment: row.comment.clone(),
        seq: Some(row.seq),
        state: SyncState::Clean,
    }
}

/// Map a pulled activity row to its local mirror.
#[must_use]
pub fn activity_from_wire(row: &ActivityRow) -> Activity {
    Activity {
        local_id: None,
        server_id: row.id,
        name: row.name.clone(),
        description: row.description.clone(),
        active: row.active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_report() -> Report {
        let start = Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap();
        let stop = Utc.with_ymd_and_hms(2024, 5, 3, 10, 30, 0).unwrap();
        Report::new(4, start, stop, "wire test")
    }

    #[test]
    fn local_only_report_serializes_with_unassigned_id() {
        let row = report_to_wire(&sample_report());
        assert_eq!(row.id, UNASSIGNED_ID);
        assert_eq!(row.seq, UNASSIGNED_ID);
        assert!(!row.deleted);
    }

    #[test]
    fn pending_delete_maps_to_tombstone() {
        let mut report = sample_report();
        report.server_id = Some(9);
        report.state = SyncState::PendingDelete;

        let row = report_to_wire(&report);
        assert_eq!(row.id, 9);
        assert!(row.deleted);
    }

    #[test]
    fn pulled_row_becomes_a_clean_local_report() {
        let mut row = report_to_wire(&sample_report());
        row.id = 12;
        row.seq = 77;

        let report = report_from_wire(&row);
        assert_eq!(report.server_id, Some(12));
        assert_eq!(report.seq, Some(77));
        assert_eq!(report.state, SyncState::Clean);
        assert!(report.local_id.is_none());
    }

    #[test]
    fn report_row_deserializes_with_defaults() {
        let json = r#"{
            "id": 3,
            "user_id": 1,
            "activity_id": 2,
            "start": "2024-05-03T09:00:00Z",
            "stop": "2024-05-03T10:00:00Z"
        }"#;
        let row: ReportRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.comment, "");
        assert_eq!(row.seq, 0);
        assert!(!row.deleted);
    }

    #[test]
    fn activity_row_maps_to_mirror() {
        let row = ActivityRow {
            id: 7,
            name: "Development".to_string(),
            description: "Project work".to_string(),
            active: true,
        };
        let activity = activity_from_wire(&row);
        assert_eq!(activity.server_id, 7);
        assert_eq!(activity.name, "Development");
        assert!(activity.local_id.is_none());
    }
}
