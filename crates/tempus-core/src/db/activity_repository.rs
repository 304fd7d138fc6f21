//! Activity repository implementation

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::Activity;

/// Trait for activity storage operations
pub trait ActivityRepository {
    /// List activities that can be booked against, ordered by name
    fn list_active(&self) -> Result<Vec<Activity>>;

    /// List all mirrored activities, ordered by name
    fn list_all(&self) -> Result<Vec<Activity>>;

    /// Look up an activity by its remote id
    fn get_by_server_id(&self, server_id: i64) -> Result<Option<Activity>>;

    /// Insert a row mirrored from the server
    fn insert_mirrored(&self, activity: &Activity) -> Result<i64>;

    /// Overwrite a mirrored row with fresh server values
    fn update_mirrored(&self, activity: &Activity) -> Result<()>;

    /// Number of mirrored activities
    fn count(&self) -> Result<i64>;
}

/// `SQLite` implementation of `ActivityRepository`
pub struct SqliteActivityRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteActivityRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
        Ok(Activity {
            local_id: row.get(0)?,
            server_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            active: row.get::<_, i32>(4)? != 0,
        })
    }

    fn list_where(&self, filter: &str) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT local_id, server_id, name, description, active
             FROM activities
             {filter}
             ORDER BY name ASC"
        ))?;

        let activities = stmt
            .query_map([], Self::parse_activity)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(activities)
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn list_active(&self) -> Result<Vec<Activity>> {
        self.list_where("WHERE active = 1")
    }

    fn list_all(&self) -> Result<Vec<Activity>> {
        self.list_where("")
    }

    fn get_by_server_id(&self, server_id: i64) -> Result<Option<Activity>> {
        let activity = self
            .conn
            .query_row(
                "SELECT local_id, server_id, name, description, active
                 FROM activities
                 WHERE server_id = ?",
                params![server_id],
                Self::parse_activity,
            )
            .optional()?;

        Ok(activity)
    }

    fn insert_mirrored(&self, activity: &Activity) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO activities (server_id, name, description, active)
             VALUES (?, ?, ?, ?)",
            params![
                activity.server_id,
                activity.name,
                activity.description,
                i32::from(activity.active)
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_mirrored(&self, activity: &Activity) -> Result<()> {
        self.conn.execute(
            "UPDATE activities SET name = ?, description = ?, active = ?
             WHERE server_id = ?",
            params![
                activity.name,
                activity.description,
                i32::from(activity.active),
                activity.server_id
            ],
        )?;

        Ok(())
    }

    fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn activity(server_id: i64, name: &str, active: bool) -> Activity {
        Activity {
            local_id: None,
            server_id,
            name: name.to_string(),
            description: String::new(),
            active,
        }
    }

    #[test]
    fn insert_and_get_by_server_id() {
        let db = setup();
        let repo = SqliteActivityRepository::new(db.connection());

        repo.insert_mirrored(&activity(7, "Development", true))
            .unwrap();

        let fetched = repo.get_by_server_id(7).unwrap().unwrap();
        assert_eq!(fetched.name, "Development");
        assert!(fetched.active);
        assert!(fetched.local_id.is_some());

        assert!(repo.get_by_server_id(99).unwrap().is_none());
    }

    #[test]
    fn list_is_ordered_by_name_and_filters_inactive() {
        let db = setup();
        let repo = SqliteActivityRepository::new(db.connection());

        repo.insert_mirrored(&activity(2, "Zoology", true)).unwrap();
        repo.insert_mirrored(&activity(1, "Admin", true)).unwrap();
        repo.insert_mirrored(&activity(3, "Retired", false)).unwrap();

        let active = repo.list_active().unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].name, "Admin");
        assert_eq!(active[1].name, "Zoology");

        assert_eq!(repo.list_all().unwrap().len(), 3);
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn update_mirrored_overwrites_fields() {
        let db = setup();
        let repo = SqliteActivityRepository::new(db.connection());

        repo.insert_mirrored(&activity(5, "Old name", true)).unwrap();

        let mut updated = activity(5, "New name", false);
        updated.description = "renamed on the server".to_string();
        repo.update_mirrored(&updated).unwrap();

        let fetched = repo.get_by_server_id(5).unwrap().unwrap();
        assert_eq!(fetched.name, "New name");
        assert_eq!(fetched.description, "renamed on the server");
        assert!(!fetched.active);
    }
}
