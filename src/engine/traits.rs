//! Rendering engine and session traits.

use async_trait::async_trait;
use serde_json::Value;

use crate::discovery::ScanTarget;

use super::error::{AuditError, SessionError};

/// An isolated document context that can load one file at a time and run
/// the rule evaluator against it.
///
/// A session is owned by exactly one worker while checked out of the pool.
#[async_trait]
pub trait Session: Send {
    /// Navigate to the target by local file reference.
    async fn load(&mut self, target: &ScanTarget) -> Result<(), AuditError>;

    /// Run the rule evaluator on the loaded document and return its raw
    /// response. The response is validated by the caller.
    async fn audit(&mut self) -> Result<Value, AuditError>;

    /// Shut the session down gracefully.
    async fn close(&mut self);

    /// Force the session down without waiting. Must not block.
    fn terminate(&mut self);
}

/// Factory for sessions.
#[async_trait]
pub trait RenderingEngine: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &'static str;

    async fn open_session(&self) -> Result<Box<dyn Session>, SessionError>;
}
