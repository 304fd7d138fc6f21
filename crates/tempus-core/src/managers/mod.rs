//! Foreground entity managers
//!
//! One manager per entity kind. Each owns a foreground database connection
//! for reads and local writes, plus the background worker and scheduler that
//! keep the entity reconciled with the server.

mod activity;
mod report;

pub use activity::ActivityManager;
pub use report::ReportManager;
