//! Remote client for the sync REST surface

mod http;
pub mod wire;

pub use http::{ActivityRemote, HttpRemote, ReportRemote};
