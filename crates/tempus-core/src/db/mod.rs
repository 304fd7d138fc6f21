//! Local store for Tempus

mod activity_repository;
mod connection;
mod migrations;
mod report_repository;

pub use activity_repository::{ActivityRepository, SqliteActivityRepository};
pub use connection::Database;
pub use report_repository::{ReportRepository, SqliteReportRepository};
