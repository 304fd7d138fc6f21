use std::path::Path;

use chrono::Local;
use tempus_core::{Report, SyncSettings};

use crate::commands::common::{open_report_manager, parse_moment};
use crate::error::CliError;

pub fn run_add(
    activity: i64,
    start: &str,
    stop: &str,
    comment_parts: &[String],
    db_path: &Path,
    settings: SyncSettings,
) -> Result<(), CliError> {
    let today = Local::now().date_naive();
    let start = parse_moment(start, today)?;
    let stop = parse_moment(stop, today)?;
    let comment = comment_parts.join(" ");

    let manager = open_report_manager(db_path, settings)?;
    let mut report = Report::new(activity, start, stop, comment);
    let local_id = manager.store(&mut report)?;

    println!("{local_id}");
    Ok(())
}
