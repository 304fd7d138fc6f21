use std::path::Path;
use std::time::Duration;

use tempus_core::SyncSettings;

use crate::commands::common::{open_activity_manager, open_report_manager};
use crate::error::CliError;

/// Generous bound on one manual pass; the per-request network timeout fails
/// much earlier in practice.
const PASS_TIMEOUT_SECS: u64 = 120;

pub fn run_sync(db_path: &Path, settings: SyncSettings) -> Result<(), CliError> {
    if !settings.is_configured() {
        return Err(CliError::SyncNotConfigured);
    }

    let activities = open_activity_manager(db_path, settings.clone())?;
    let reports = open_report_manager(db_path, settings)?;

    // Clear the init notifications so the waits below see exactly the
    // pass-completed ones.
    while activities.updates().try_recv().is_ok() {}
    while reports.updates().try_recv().is_ok() {}

    activities.sync()?;
    reports.sync()?;

    // Each worker notifies once per finished pass, success or not.
    let timeout = Duration::from_secs(PASS_TIMEOUT_SECS);
    for updates in [activities.updates(), reports.updates()] {
        updates
            .recv_timeout(timeout)
            .map_err(|_| CliError::SyncTimeout(PASS_TIMEOUT_SECS))?;
    }

    let pending = reports.unsynced_count()?;
    if pending == 0 {
        println!("Sync completed");
    } else {
        println!("Sync finished with {pending} report(s) still pending");
    }
    Ok(())
}
