//! Synchronization engine
//!
//! [`protocol`] holds the reconciliation algorithm (push then pull),
//! [`worker`] the per-manager background thread that runs it, and
//! [`scheduler`] the jittered periodic trigger.

pub mod protocol;
pub mod scheduler;
pub mod worker;

pub use protocol::{sync_activities, sync_reports, ReportSyncSummary};
pub use scheduler::Scheduler;
pub use worker::{Command, SyncJob, SyncWorker};
