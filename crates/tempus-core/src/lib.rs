//! tempus-core - Core library for Tempus
//!
//! This crate contains the shared models, local store, remote client, and
//! synchronization engine used by all Tempus front ends. The front end only
//! ever sees the managers ([`managers::ActivityManager`],
//! [`managers::ReportManager`]) and the `updated` notification channel; the
//! sync workers and scheduler run on their own threads behind them.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod managers;
pub mod models;
pub mod remote;
pub mod sync;

pub use config::SyncSettings;
pub use error::{Error, Result};
pub use models::{Activity, Report, SyncState};
