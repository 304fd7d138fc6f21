use std::path::Path;

use serde::Serialize;
use tempus_core::{Activity, SyncSettings};

use crate::commands::common::open_activity_manager;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ActivityListItem {
    id: i64,
    name: String,
    description: String,
    active: bool,
}

pub fn run_activities(
    include_inactive: bool,
    as_json: bool,
    db_path: &Path,
    settings: SyncSettings,
) -> Result<(), CliError> {
    let manager = open_activity_manager(db_path, settings)?;
    let activities = if include_inactive {
        manager.list_all()?
    } else {
        manager.list()?
    };

    if as_json {
        let items = activities.iter().map(to_list_item).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if activities.is_empty() {
        println!("No activities mirrored yet; run `tempus sync` first.");
        return Ok(());
    }

    for activity in &activities {
        let marker = if activity.active { "" } else { "  (inactive)" };
        if activity.description.is_empty() {
            println!("{:>4}  {}{marker}", activity.server_id, activity.name);
        } else {
            println!(
                "{:>4}  {}  - {}{marker}",
                activity.server_id, activity.name, activity.description
            );
        }
    }
    Ok(())
}

fn to_list_item(activity: &Activity) -> ActivityListItem {
    ActivityListItem {
        id: activity.server_id,
        name: activity.name.clone(),
        description: activity.description.clone(),
        active: activity.active,
    }
}
