//! Report model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Synchronization state of a locally stored report.
///
/// Exactly one state applies to a row at any time. `PendingDelete` takes
/// precedence over `Dirty`: once a row is flagged for deletion, local edits
/// no longer change its state and the update push never selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Row matches the server's copy (or has never been pushed)
    #[default]
    Clean,
    /// Row exists remotely and has unpushed local changes
    Dirty,
    /// Row awaits remote tombstoning; it stays locally until a pull removes it
    PendingDelete,
}

impl SyncState {
    /// Stable string form used in the local store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::PendingDelete => "pending_delete",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clean" => Some(Self::Clean),
            "dirty" => Some(Self::Dirty),
            "pending_delete" => Some(Self::PendingDelete),
            _ => None,
        }
    }
}

/// A time entry booked against an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Local primary key, assigned by the local store on insert
    pub local_id: Option<i64>,
    /// Remote primary key; `None` until the row has been accepted remotely
    pub server_id: Option<i64>,
    /// Owner of the report on the server
    pub user_id: i64,
    /// References `Activity::server_id`
    pub activity_id: i64,
    /// Start of the tracked interval
    pub start: DateTime<Utc>,
    /// End of the tracked interval, `stop >= start`
    pub stop: DateTime<Utc>,
    /// Free-text comment
    pub comment: String,
    /// Server-assigned modification sequence number; `None` on rows that
    /// have never been seen by the server. Authoritative ordering token.
    pub seq: Option<i64>,
    /// Local synchronization state
    pub state: SyncState,
}

impl Report {
    /// Create a new, local-only report.
    #[must_use]
    pub fn new(
        activity_id: i64,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            local_id: None,
            server_id: None,
            user_id: -1,
            activity_id,
            start,
            stop,
            comment: comment.into(),
            seq: None,
            state: SyncState::Clean,
        }
    }

    /// Length of the tracked interval.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.stop - self.start
    }

    /// Whether the row is fully reconciled with the server.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.server_id.is_some() && self.state == SyncState::Clean
    }

    /// Validate required fields before persisting.
    pub fn validate(&self) -> Result<()> {
        if self.activity_id <= 0 {
            return Err(Error::InvalidInput(
                "report requires a valid activity".to_string(),
            ));
        }
        if self.stop < self.start {
            return Err(Error::InvalidInput(
                "report stop time must not precede its start time".to_string(),
            ));
        }
        Ok(())
    }
}
