//! In-process engine backed by the built-in markup heuristics.

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::discovery::ScanTarget;
use crate::rules::builtin;

use super::error::{AuditError, SessionError};
use super::traits::{RenderingEngine, Session};

/// Audits raw file contents without rendering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEngine;

impl StaticEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderingEngine for StaticEngine {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn open_session(&self) -> Result<Box<dyn Session>, SessionError> {
        Ok(Box::new(StaticSession::default()))
    }
}

#[derive(Debug, Default)]
struct StaticSession {
    document: Option<String>,
}

#[async_trait]
impl Session for StaticSession {
    async fn load(&mut self, target: &ScanTarget) -> Result<(), AuditError> {
        self.document = None;
        let bytes = tokio::fs::read(&target.path)
            .await
            .map_err(|e| AuditError::Navigation {
                path: target.relative_path.clone(),
                message: e.to_string(),
            })?;
        trace!(path = %target.relative_path, bytes = bytes.len(), "Loaded document");
        self.document = Some(String::from_utf8_lossy(&bytes).into_owned());
        Ok(())
    }

    async fn audit(&mut self) -> Result<Value, AuditError> {
        let document = self
            .document
            .as_deref()
            .ok_or_else(|| AuditError::Evaluator("no document loaded".to_string()))?;
        Ok(builtin::evaluate(document))
    }

    async fn close(&mut self) {
        self.document = None;
    }

    fn terminate(&mut self) {
        self.document = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_audit_response;
    use crate::rules::Impact;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn target_for(dir: &TempDir, name: &str, content: &str) -> ScanTarget {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        ScanTarget::new(dir.path(), path, content.len() as u64)
    }

    #[tokio::test]
    async fn test_image_without_alt_is_critical() {
        let dir = TempDir::new().unwrap();
        let target = target_for(
            &dir,
            "index.html",
            r#"<html lang="en"><head><title>x</title></head><body><img src="a.png"></body></html>"#,
        );

        let mut session = StaticEngine::new().open_session().await.unwrap();
        session.load(&target).await.unwrap();
        let outcome = parse_audit_response(&session.audit().await.unwrap()).unwrap();
        session.close().await;

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].id, "image-alt");
        assert_eq!(outcome.violations[0].impact, Some(Impact::Critical));
    }

    #[tokio::test]
    async fn test_missing_file_is_navigation_error() {
        let target = ScanTarget::new(
            Path::new("/nonexistent"),
            Path::new("/nonexistent/missing.html").to_path_buf(),
            0,
        );

        let mut session = StaticEngine::new().open_session().await.unwrap();
        let err = session.load(&target).await.unwrap_err();
        assert!(matches!(err, AuditError::Navigation { ref path, .. } if path == "missing.html"));
    }

    #[tokio::test]
    async fn test_audit_before_load_fails() {
        let mut session = StaticEngine::new().open_session().await.unwrap();
        assert!(matches!(
            session.audit().await,
            Err(AuditError::Evaluator(_))
        ));
    }
}
