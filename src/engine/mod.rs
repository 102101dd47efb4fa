//! Rendering engines.
//!
//! This module provides:
//! - `Session` / `RenderingEngine` traits the orchestrator drives
//! - `BrowserEngine`: puppeteer + axe-core behind a Node.js driver process
//! - `StaticEngine`: built-in heuristics evaluated in process
//! - Strict validation of evaluator responses

pub mod browser;
pub mod error;
pub mod schema;
pub mod static_engine;
pub mod traits;

use std::sync::Arc;

pub use browser::BrowserEngine;
pub use error::{AuditError, AuditTimeout, SessionError};
pub use schema::{AuditOutcome, parse_audit_response};
pub use static_engine::StaticEngine;
pub use traits::{RenderingEngine, Session};

use crate::config::{EngineKind, RunConfig};

/// Build the engine selected by `config`.
pub fn build(config: &RunConfig) -> Result<Arc<dyn RenderingEngine>, SessionError> {
    Ok(match config.engine().kind {
        EngineKind::Browser => Arc::new(BrowserEngine::new(config)?),
        EngineKind::Static => Arc::new(StaticEngine::new()),
    })
}
