//! Data models for Tempus

mod activity;
mod report;

pub use activity::Activity;
pub use report::{Report, SyncState};
