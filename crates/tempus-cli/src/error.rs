use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tempus_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Unrecognized time '{0}'; expected HH:MM or YYYY-MM-DDTHH:MM")]
    InvalidTime(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Set server_url in the config file or TEMPUS_SERVER_URL to enable `tempus sync`."
    )]
    SyncNotConfigured,
    #[error("Sync pass did not finish within {0} seconds")]
    SyncTimeout(u64),
}
