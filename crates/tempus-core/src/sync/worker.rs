//! Background sync worker
//!
//! One named OS thread per entity kind. The thread owns its own database
//! connection (opened once at startup) and drains a command queue; queued
//! sync requests that pile up while a pass runs simply trigger back-to-back
//! passes, which the idempotent protocol turns into cheap no-ops.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::db::Database;
use crate::error::Result;
use crate::events::Notifier;

/// Messages a worker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run one sync pass
    Sync,
    /// Drain out and exit
    Quit,
}

/// One entity kind's sync pass, run on the worker thread.
pub trait SyncJob: Send + 'static {
    /// Short name used for the thread and in logs
    fn name(&self) -> &'static str;

    /// Run a single pass against the worker's private connection
    fn run(&mut self, db: &Database) -> Result<()>;
}

/// Handle to a background sync thread.
///
/// Dropping the handle asks the thread to quit and joins it.
pub struct SyncWorker {
    tx: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Spawn a worker that opens `db_path` on its own thread and runs `job`
    /// for every queued [`Command::Sync`].
    ///
    /// The notifier fires after every pass, success or failure, so observers
    /// re-read their state either way.
    pub fn spawn<J: SyncJob>(
        db_path: std::path::PathBuf,
        notifier: Notifier,
        mut job: J,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let name = job.name();

        let handle = std::thread::Builder::new()
            .name(format!("sync-{name}"))
            .spawn(move || {
                let db = match Database::open(&db_path) {
                    Ok(db) => db,
                    Err(error) => {
                        tracing::error!("{name} worker cannot open {}: {error}", db_path.display());
                        drain_until_quit(&rx);
                        return;
                    }
                };

                for command in &rx {
                    match command {
                        Command::Sync => {
                            if let Err(error) = job.run(&db) {
                                tracing::warn!("{name} sync pass failed: {error}");
                            }
                            notifier.updated();
                        }
                        Command::Quit => break,
                    }
                }
                tracing::debug!("{name} worker exiting");
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Queue one sync pass. A no-op once the worker has quit.
    pub fn request_sync(&self) {
        let _ = self.tx.send(Command::Sync);
    }

    /// A sender other threads (the scheduler) can queue commands on.
    #[must_use]
    pub fn sender(&self) -> Sender<Command> {
        self.tx.clone()
    }

    /// Ask the thread to exit and wait for it.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Command::Quit);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Keep the queue serviced when the connection never opened, so senders do
/// not observe a dead channel before shutdown.
fn drain_until_quit(rx: &Receiver<Command>) {
    for command in rx {
        if command == Command::Quit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingJob {
        passes: Arc<AtomicUsize>,
        fail: bool,
    }

    impl SyncJob for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn run(&mut self, _db: &Database) -> Result<()> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::Error::Remote("down".to_string()));
            }
            Ok(())
        }
    }

    fn temp_db_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("worker.db")
    }

    #[test]
    fn runs_a_pass_per_request_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (notifier, updates) = events::channel();
        let passes = Arc::new(AtomicUsize::new(0));

        let mut worker = SyncWorker::spawn(
            temp_db_path(&dir),
            notifier,
            CountingJob {
                passes: Arc::clone(&passes),
                fail: false,
            },
        )
        .unwrap();

        worker.request_sync();
        worker.request_sync();
        updates.recv_timeout(Duration::from_secs(5)).unwrap();
        updates.recv_timeout(Duration::from_secs(5)).unwrap();

        worker.stop();
        assert_eq!(passes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_pass_still_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let (notifier, updates) = events::channel();
        let passes = Arc::new(AtomicUsize::new(0));

        let worker = SyncWorker::spawn(
            temp_db_path(&dir),
            notifier,
            CountingJob {
                passes: Arc::clone(&passes),
                fail: true,
            },
        )
        .unwrap();

        worker.request_sync();
        updates.recv_timeout(Duration::from_secs(5)).unwrap();
        drop(worker);
        assert_eq!(passes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_joins_the_thread() {
        let dir = tempfile::tempdir().unwrap();
        let (notifier, _updates) = events::channel();
        let passes = Arc::new(AtomicUsize::new(0));

        let mut worker = SyncWorker::spawn(
            temp_db_path(&dir),
            notifier,
            CountingJob {
                passes: Arc::clone(&passes),
                fail: false,
            },
        )
        .unwrap();

        worker.stop();
        // Requests after stop are dropped silently.
        worker.request_sync();
        assert_eq!(passes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unopenable_database_drains_commands_until_quit() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the database path makes the open fail.
        let path = temp_db_path(&dir);
        std::fs::create_dir(&path).unwrap();

        let (notifier, updates) = events::channel();
        let passes = Arc::new(AtomicUsize::new(0));

        let mut worker = SyncWorker::spawn(
            path,
            notifier,
            CountingJob {
                passes: Arc::clone(&passes),
                fail: false,
            },
        )
        .unwrap();

        worker.request_sync();
        worker.stop();
        assert_eq!(passes.load(Ordering::SeqCst), 0);
        assert!(updates.try_recv().is_err());
    }
}
