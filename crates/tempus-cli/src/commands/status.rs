use std::path::Path;

use tempus_core::SyncSettings;

use crate::commands::common::{open_activity_manager, open_report_manager};
use crate::error::CliError;

pub fn run_status(db_path: &Path, settings: SyncSettings) -> Result<(), CliError> {
    let reports = open_report_manager(db_path, settings.clone())?;
    let activities = open_activity_manager(db_path, settings.clone())?;

    println!("Database:         {}", db_path.display());
    if settings.is_configured() {
        println!("Server:           {}", settings.server_url);
        println!(
            "Autosync:         {}",
            if settings.autosync { "on" } else { "off" }
        );
    } else {
        println!("Server:           not configured");
    }
    println!("Activities:       {}", activities.list_all()?.len());
    println!("Pending reports:  {}", reports.unsynced_count()?);
    println!("Watermark:        {}", reports.watermark()?);
    Ok(())
}
