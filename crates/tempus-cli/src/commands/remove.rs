use std::path::Path;

use tempus_core::SyncSettings;

use crate::commands::common::open_report_manager;
use crate::error::CliError;

pub fn run_remove(id: i64, db_path: &Path, settings: SyncSettings) -> Result<(), CliError> {
    let manager = open_report_manager(db_path, settings)?;
    manager.remove(id)?;
    println!("{id}");
    Ok(())
}
