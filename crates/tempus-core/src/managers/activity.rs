//! Activity manager
//!
//! Activities are defined on the server and mirrored read-only into the
//! local store, so this manager is much smaller than the report one: reads
//! from the mirror, plus the background refresh machinery.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::config::SyncSettings;
use crate::db::{ActivityRepository, Database, SqliteActivityRepository};
use crate::error::{Error, Result};
use crate::events::{self, Notification};
use crate::models::Activity;
use crate::remote::HttpRemote;
use crate::sync::{protocol, Scheduler, SyncJob, SyncWorker};

struct ActivitySyncJob {
    settings: SyncSettings,
}

impl SyncJob for ActivitySyncJob {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn run(&mut self, db: &Database) -> Result<()> {
        let remote = HttpRemote::new(&self.settings)?;
        let repo = SqliteActivityRepository::new(db.connection());
        let refreshed = protocol::sync_activities(&repo, &remote)?;
        tracing::info!("activity refresh: {refreshed} rows written");
        Ok(())
    }
}

/// Foreground handle for reading the activity mirror.
pub struct ActivityManager {
    db: Database,
    worker: Option<SyncWorker>,
    scheduler: Option<Scheduler>,
    updates: Receiver<Notification>,
}

impl ActivityManager {
    /// Open the manager over the database at `db_path`.
    ///
    /// Worker and scheduler follow the same rules as the report manager:
    /// no server URL means purely local, a nonzero refresh interval arms
    /// the periodic scheduler.
    pub fn open(db_path: impl Into<PathBuf>, settings: SyncSettings) -> Result<Self> {
        let db_path = db_path.into();
        let db = Database::open(&db_path)?;
        let (notifier, updates) = events::channel();
        // Observers treat the opened store as fresh data.
        notifier.updated();

        let mut worker = None;
        let mut scheduler = None;
        if settings.is_configured() {
            let spawned = SyncWorker::spawn(
                db_path,
                notifier,
                ActivitySyncJob {
                    settings: settings.clone(),
                },
            )?;

            // The interval alone governs periodic refreshes; autosync only
            // concerns report mutations.
            let interval = settings.activity_sync_interval();
            let sender = spawned.sender();
            scheduler = Some(Scheduler::start("activity", interval, move || {
                let _ = sender.send(crate::sync::Command::Sync);
            })?);
            worker = Some(spawned);
        }

        Ok(Self {
            db,
            worker,
            scheduler,
            updates,
        })
    }

    fn repo(&self) -> SqliteActivityRepository<'_> {
        SqliteActivityRepository::new(self.db.connection())
    }

    /// Look up one activity by its server id.
    pub fn get(&self, server_id: i64) -> Result<Option<Activity>> {
        self.repo().get_by_server_id(server_id)
    }

    /// Activities currently offered for tracking, ordered by name.
    pub fn list(&self) -> Result<Vec<Activity>> {
        self.repo().list_active()
    }

    /// Every mirrored activity, including deactivated ones. Old reports may
    /// still reference those.
    pub fn list_all(&self) -> Result<Vec<Activity>> {
        self.repo().list_all()
    }

    /// Queue a refresh now. Fails when no server URL is configured.
    pub fn sync(&self) -> Result<()> {
        match &self.worker {
            Some(worker) => {
                worker.request_sync();
                Ok(())
            }
            None => Err(Error::InvalidInput(
                "sync server URL is not configured".to_string(),
            )),
        }
    }

    /// Reconfigure the periodic trigger; `None` disables it.
    pub fn set_sync_interval(&self, interval: Option<Duration>) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.set_interval(interval);
        }
    }

    /// Channel that receives a notification after opening and after every
    /// refresh pass.
    pub const fn updates(&self) -> &Receiver<Notification> {
        &self.updates
    }

    /// Stop the scheduler and worker, waiting for the threads.
    pub fn stop(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}

impl Drop for ActivityManager {
    fn drop(&mut self) {
        self.stop();
    }
}
