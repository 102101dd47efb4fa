use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::SessionError;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Session pool exhausted: {0}")]
    SessionPoolExhausted(String),

    #[error("Rendering engine unavailable: {0}")]
    Session(SessionError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to write report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SessionError> for ScanError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::PoolExhausted(message) => ScanError::SessionPoolExhausted(message),
            other => ScanError::Session(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
