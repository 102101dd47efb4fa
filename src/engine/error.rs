//! Rendering engine error types.

use std::time::Duration;

/// Opening a session failed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to launch session driver `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Session driver did not become ready within {}s", .0.as_secs())]
    StartupTimeout(Duration),

    #[error("Session driver failed during startup: {0}")]
    Startup(String),

    #[error("Failed to prepare session driver: {0}")]
    Setup(#[source] std::io::Error),

    #[error("Session pool is closed")]
    PoolClosed,

    #[error("No session slot could be opened: {0}")]
    PoolExhausted(String),
}

/// A single audit attempt failed. Retried with a fresh session, then
/// reported as a per-file `error`.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Failed to load {path}: {message}")]
    Navigation { path: String, message: String },

    #[error("Rule evaluator failed: {0}")]
    Evaluator(String),

    #[error("Malformed audit response: {0}")]
    Malformed(String),

    #[error("Session crashed: {0}")]
    SessionCrashed(String),
}

/// The load and audit of one file exceeded its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Audit exceeded {}s budget", .budget.as_secs())]
pub struct AuditTimeout {
    pub budget: Duration,
}
