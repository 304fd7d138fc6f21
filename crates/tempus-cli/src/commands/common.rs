use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tempus_core::managers::{ActivityManager, ReportManager};
use tempus_core::{Report, SyncSettings, SyncState};

use crate::error::CliError;

/// Resolve the database path: flag, then environment, then the platform
/// data directory.
pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("TEMPUS_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempus")
        .join("tempus.db")
}

/// Load sync settings from the config file, then apply environment
/// overrides. A missing file yields the defaults.
pub fn load_settings() -> Result<SyncSettings, CliError> {
    let mut settings = match config_file_path() {
        Some(path) if path.exists() => read_settings_file(&path)?,
        _ => SyncSettings::default(),
    };

    if let Ok(url) = env::var("TEMPUS_SERVER_URL") {
        settings.server_url = url;
    }

    Ok(settings)
}

fn config_file_path() -> Option<PathBuf> {
    env::var_os("TEMPUS_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("tempus").join("config.json")))
}

fn read_settings_file(path: &Path) -> Result<SyncSettings, CliError> {
    tracing::debug!("loading settings from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|error| CliError::Config(format!("{}: {error}", path.display())))
}

pub fn open_report_manager(
    db_path: &Path,
    settings: SyncSettings,
) -> Result<ReportManager, CliError> {
    Ok(ReportManager::open(db_path, settings)?)
}

pub fn open_activity_manager(
    db_path: &Path,
    settings: SyncSettings,
) -> Result<ActivityManager, CliError> {
    Ok(ActivityManager::open(db_path, settings)?)
}

/// Parse a moment entered on the command line.
///
/// Accepts a bare `HH:MM` (interpreted as local time on `today`) or a full
/// `YYYY-MM-DDTHH:MM[:SS]` local timestamp.
pub fn parse_moment(value: &str, today: NaiveDate) -> Result<DateTime<Utc>, CliError> {
    let trimmed = value.trim();

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return local_to_utc(naive);
        }
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return local_to_utc(today.and_time(time));
    }

    Err(CliError::InvalidTime(value.to_string()))
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, CliError> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(moment) | LocalResult::Ambiguous(moment, _) => {
            Ok(moment.with_timezone(&Utc))
        }
        LocalResult::None => Err(CliError::InvalidTime(naive.to_string())),
    }
}

/// One formatted listing line per report: local id, interval, duration,
/// activity, comment, with a trailing `*` on rows the server has not
/// confirmed yet.
pub fn format_report_lines(reports: &[Report], activities: &ActivityManager) -> Vec<String> {
    reports
        .iter()
        .map(|report| {
            let local_id = report.local_id.unwrap_or_default();
            let start = report.start.with_timezone(&Local).format("%H:%M");
            let stop = report.stop.with_timezone(&Local).format("%H:%M");
            let duration = format_duration_minutes(report.duration().num_minutes());
            let activity = activities
                .get(report.activity_id)
                .ok()
                .flatten()
                .map_or_else(|| format!("activity {}", report.activity_id), |a| a.name);
            let marker = if report.is_synced() { "" } else { " *" };

            let mut line = format!("{local_id:>4}  {start}-{stop}  {duration:>6}  {activity}");
            if !report.comment.is_empty() {
                line.push_str("  ");
                line.push_str(&report.comment);
            }
            line.push_str(marker);
            line
        })
        .collect()
}

pub fn format_duration_minutes(minutes: i64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// The sync state as shown in JSON listings.
pub const fn state_label(state: SyncState) -> &'static str {
    state.as_str()
}
