//! Activity model

use serde::{Deserialize, Serialize};

/// A reference category that reports are booked against.
///
/// Activities are a read-only mirror of the server's activity table: they are
/// never created, edited, or deleted from the client, only refreshed during a
/// sync pass. Every locally held activity corresponds to exactly one remote
/// record, addressed by `server_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Local primary key, assigned by the local store on insert
    pub local_id: Option<i64>,
    /// Remote primary key; always known since activities originate remotely
    pub server_id: i64,
    /// Display name
    pub name: String,
    /// Longer description
    pub description: String,
    /// Whether the activity is selectable for new reports
    pub active: bool,
}

impl Activity {
    /// Whether the mirrored fields differ from the given remote values.
    ///
    /// Used by the pull phase to skip rewriting rows that are already
    /// up to date.
    #[must_use]
    pub fn mirror_differs(&self, name: &str, description: &str, active: bool) -> bool {
        self.name != name || self.description != description || self.active != active
    }
}
