use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tempus_core::{Report, SyncSettings};

use crate::commands::common::{
    format_report_lines, open_activity_manager, open_report_manager, state_label,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ReportListItem {
    id: i64,
    server_id: Option<i64>,
    activity_id: i64,
    activity: Option<String>,
    start: String,
    stop: String,
    minutes: i64,
    comment: String,
    state: &'static str,
}

pub fn run_list(
    day: Option<NaiveDate>,
    as_json: bool,
    db_path: &Path,
    settings: SyncSettings,
) -> Result<(), CliError> {
    let day = day.unwrap_or_else(|| Local::now().date_naive());

    let reports = open_report_manager(db_path, settings.clone())?.list(day)?;
    let activities = open_activity_manager(db_path, settings)?;

    if as_json {
        let items = reports
            .iter()
            .map(|report| to_list_item(report, &activities))
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No reports for {day}.");
        return Ok(());
    }

    for line in format_report_lines(&reports, &activities) {
        println!("{line}");
    }
    Ok(())
}

fn to_list_item(
    report: &Report,
    activities: &tempus_core::managers::ActivityManager,
) -> ReportListItem {
    ReportListItem {
        id: report.local_id.unwrap_or_default(),
        server_id: report.server_id,
        activity_id: report.activity_id,
        activity: activities
            .get(report.activity_id)
            .ok()
            .flatten()
            .map(|activity| activity.name),
        start: report.start.to_rfc3339(),
        stop: report.stop.to_rfc3339(),
        minutes: report.duration().num_minutes(),
        comment: report.comment.clone(),
        state: state_label(report.state),
    }
}
