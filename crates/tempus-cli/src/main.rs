//! Tempus CLI - offline-first time tracking from the terminal
//!
//! Every command works without a server; `sync` and the autosync machinery
//! reconcile the local store whenever one is configured.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::{load_settings, resolve_db_path};
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tempus=info".parse().map_err(|_| {
                    CliError::Config("invalid default log directive".to_string())
                })?),
        )
        .init();

    let args = Cli::parse();
    let db_path = resolve_db_path(args.db_path);
    let settings = load_settings()?;

    match args.command {
        Commands::Add {
            activity,
            start,
            stop,
            comment,
        } => commands::add::run_add(activity, &start, &stop, &comment, &db_path, settings),
        Commands::List { day, json } => commands::list::run_list(day, json, &db_path, settings),
        Commands::Remove { id } => commands::remove::run_remove(id, &db_path, settings),
        Commands::Activities { all, json } => {
            commands::activities::run_activities(all, json, &db_path, settings)
        }
        Commands::Sync => commands::sync::run_sync(&db_path, settings),
        Commands::Status => commands::status::run_status(&db_path, settings),
    }
}
