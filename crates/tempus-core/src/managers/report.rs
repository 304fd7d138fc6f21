//! Report manager
//!
//! The foreground API for time reports: local CRUD that never touches the
//! network, with sync delegated to a background worker. Local writes only
//! flip persistent flags, so the app stays fully usable offline.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::NaiveDate;

use crate::config::SyncSettings;
use crate::db::{Database, ReportRepository, SqliteReportRepository};
use crate::error::{Error, Result};
use crate::events::{self, Notification, Notifier};
use crate::models::{Report, SyncState};
use crate::remote::HttpRemote;
use crate::sync::{protocol, Scheduler, SyncJob, SyncWorker};

/// Sync pass for reports, run on the worker thread.
///
/// A fresh HTTP client per pass keeps settings changes cheap and avoids
/// holding sockets across long idle stretches.
struct ReportSyncJob {
    settings: SyncSettings,
}

impl SyncJob for ReportSyncJob {
    fn name(&self) -> &'static str {
        "report"
    }

    fn run(&mut self, db: &Database) -> Result<()> {
        let remote = HttpRemote::new(&self.settings)?;
        let repo = SqliteReportRepository::new(db.connection());
        let summary = protocol::sync_reports(&repo, &remote)?;
        tracing::info!(
            "report sync: pushed {}+{}+{}, pulled {}, removed {}, watermark {}",
            summary.pushed_deletes,
            summary.pushed_creates,
            summary.pushed_updates,
            summary.pulled,
            summary.removed,
            summary.watermark,
        );
        Ok(())
    }
}

/// Foreground handle for reading and writing reports.
pub struct ReportManager {
    db: Database,
    settings: SyncSettings,
    notifier: Notifier,
    worker: Option<SyncWorker>,
    scheduler: Option<Scheduler>,
    updates: Receiver<Notification>,
}

impl ReportManager {
    /// Open the manager over the database at `db_path`.
    ///
    /// When the settings carry a server URL a background worker is spawned,
    /// and a nonzero sync interval arms the periodic scheduler. Without a
    /// server URL the manager works purely locally.
    pub fn open(db_path: impl Into<PathBuf>, settings: SyncSettings) -> Result<Self> {
        let db_path = db_path.into();
        let db = Database::open(&db_path)?;
        let (notifier, updates) = events::channel();

        let mut worker = None;
        let mut scheduler = None;
        if settings.is_configured() {
            let spawned = SyncWorker::spawn(
                db_path,
                notifier.clone(),
                ReportSyncJob {
                    settings: settings.clone(),
                },
            )?;

            // The interval alone governs periodic sync; autosync only adds
            // the on-mutation trigger.
            let interval = settings.report_sync_interval();
            let sender = spawned.sender();
            scheduler = Some(Scheduler::start("report", interval, move || {
                let _ = sender.send(crate::sync::Command::Sync);
            })?);
            worker = Some(spawned);
        }

        // Observers treat the opened store as fresh data.
        notifier.updated();

        Ok(Self {
            db,
            settings,
            notifier,
            worker,
            scheduler,
            updates,
        })
    }

    fn repo(&self) -> SqliteReportRepository<'_> {
        SqliteReportRepository::new(self.db.connection())
    }

    /// Fetch one report by local id.
    pub fn get(&self, local_id: i64) -> Result<Option<Report>> {
        self.repo().get(local_id)
    }

    /// Reports for one calendar day, ordered by start. Rows awaiting
    /// deletion are hidden.
    pub fn list(&self, day: NaiveDate) -> Result<Vec<Report>> {
        self.repo().list_for_day(day)
    }

    /// Insert or update a report, writing the assigned local id back.
    ///
    /// Editing an already-synced row flags it dirty so the next pass pushes
    /// the change. With autosync on, a pass is queued immediately.
    pub fn store(&self, report: &mut Report) -> Result<i64> {
        report.validate()?;

        let local_id = match report.local_id {
            None => {
                let id = self.repo().insert(report)?;
                report.local_id = Some(id);
                id
            }
            Some(id) => {
                if report.server_id.is_some() && report.state == SyncState::Clean {
                    report.state = SyncState::Dirty;
                }
                self.repo().update(report)?;
                id
            }
        };

        self.notifier.updated();
        self.sync_if_auto();
        Ok(local_id)
    }

    /// Delete a report.
    ///
    /// Rows the server has never seen are removed outright; synced rows are
    /// flagged for deletion and disappear from listings immediately, with
    /// the actual removal happening on the next sync pass.
    pub fn remove(&self, local_id: i64) -> Result<()> {
        let Some(report) = self.repo().get(local_id)? else {
            return Err(Error::NotFound(format!("report {local_id}")));
        };

        if report.server_id.is_none() {
            self.repo().delete(local_id)?;
        } else {
            self.repo().set_state(local_id, SyncState::PendingDelete)?;
        }

        self.notifier.updated();
        self.sync_if_auto();
        Ok(())
    }

    /// Queue a sync pass now. Fails when no server URL is configured.
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

    /// Turn sync-on-mutation on or off at runtime.
    ///
    /// Enabling it also queues one pass right away, so edits made while it
    /// was off get pushed without waiting for the next mutation or timer.
    pub fn set_autosync(&mut self, enabled: bool) {
        let was_enabled = self.settings.autosync;
        self.settings.autosync = enabled;
        if enabled && !was_enabled {
            if let Some(worker) = &self.worker {
                worker.request_sync();
            }
        }
    }

    /// Reconfigure the periodic trigger; `None` disables it.
    pub fn set_sync_interval(&self, interval: Option<Duration>) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.set_interval(interval);
        }
    }

    /// Rows not yet fully reconciled with the server.
    pub fn unsynced_count(&self) -> Result<i64> {
        self.repo().unsynced_count()
    }

    /// Highest server sequence number incorporated so far.
    pub fn watermark(&self) -> Result<i64> {
        self.repo().watermark()
    }

    /// Channel that receives a notification after opening, after every
    /// local mutation, and after every sync pass.
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

    fn sync_if_auto(&self) {
        if self.settings.autosync {
            if let Some(worker) = &self.worker {
                worker.request_sync();
            }
        }
    }
}

impl Drop for ReportManager {
    fn drop(&mut self) {
        self.stop();
    }
}
