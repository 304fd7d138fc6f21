use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tempus")]
#[command(about = "Track time against activities, offline first")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a time report
    #[command(alias = "new")]
    Add {
        /// Server id of the activity to book against
        activity: i64,
        /// Start of the interval (HH:MM for today, or YYYY-MM-DDTHH:MM)
        start: String,
        /// End of the interval, same formats as start
        stop: String,
        /// Free-text comment
        comment: Vec<String>,
    },
    /// List reports for a day
    List {
        /// Day to list (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        day: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a report
    #[command(alias = "rm")]
    Remove {
        /// Local id of the report, as shown by `tempus list`
        id: i64,
    },
    /// List activities available for booking
    Activities {
        /// Include deactivated activities
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Synchronize reports and activities with the server now
    Sync,
    /// Show sync configuration and pending work
    Status,
}
