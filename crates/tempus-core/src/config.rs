//! Sync configuration
//!
//! An explicit settings struct passed into managers and schedulers; there is
//! no global settings singleton. Interval changes after construction reach
//! the scheduler through `set_sync_interval` on the owning manager.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration consumed by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Base URL of the sync server, e.g. `http://ergotime.example.com:8000`
    pub server_url: String,
    /// Seconds between periodic activity refreshes; `0` disables
    pub activity_sync_interval_secs: u64,
    /// Seconds between periodic report sync passes; `0` disables
    pub report_sync_interval_secs: u64,
    /// Enqueue a sync pass after every local mutation
    pub autosync: bool,
    /// Per-request network timeout in seconds
    pub network_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            activity_sync_interval_secs: 600,
            report_sync_interval_secs: 600,
            autosync: false,
            network_timeout_secs: 30,
        }
    }
}

impl SyncSettings {
    /// Periodic activity refresh interval, `None` when disabled.
    #[must_use]
    pub const fn activity_sync_interval(&self) -> Option<Duration> {
        interval_from_secs(self.activity_sync_interval_secs)
    }

    /// Periodic report sync interval, `None` when disabled.
    #[must_use]
    pub const fn report_sync_interval(&self) -> Option<Duration> {
        interval_from_secs(self.report_sync_interval_secs)
    }

    /// Network timeout applied to every remote call.
    #[must_use]
    pub const fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    /// Whether a server URL has been configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.server_url.trim().is_empty()
    }
}

const fn interval_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
