//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Upper bound on concurrently open rendering sessions.
pub const MAX_POOL_SIZE: usize = 16;

/// Main configuration structure for a11y-audit.
///
/// Ordered collections keep the serialized snapshot stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository root to scan.
    pub repo_path: PathBuf,
    /// Directory that receives `report.json` and `report.html`.
    pub output_dir: PathBuf,
    /// Directory names skipped at any depth.
    pub exclude_dirs: BTreeSet<String>,
    /// Gitignore-style globs matched against file names.
    pub exclude_file_patterns: Vec<String>,
    /// Maximum number of targets per file extension. Only extensions listed
    /// here are scanned.
    pub file_limits: BTreeMap<String, usize>,
    /// Per-file audit budget in seconds (page load plus rule evaluation).
    pub timeout_per_file: u64,
    /// Number of rendering sessions, and therefore of concurrent scans.
    pub pool_size: usize,
    /// Files per page in the HTML report.
    pub page_size: usize,
    /// Extra attempts after an audit-level failure.
    pub audit_retries: u32,
    /// Session start retry policy.
    pub session_retry: RetryConfig,
    /// Rendering engine selection.
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        let exclude_dirs = [
            "node_modules",
            "dist",
            "build",
            "www",
            ".git",
            "coverage",
            ".angular",
            "ios",
            "android",
            "platforms",
            "Pods",
            "DerivedData",
            ".idea",
            ".vscode",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let exclude_file_patterns = ["*.d.ts", "*.spec.ts", "*.test.ts", "*.mock.ts", "*.data.ts"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            repo_path: PathBuf::from("."),
            output_dir: PathBuf::from("./reports"),
            exclude_dirs,
            exclude_file_patterns,
            file_limits: BTreeMap::from([("html".to_string(), 1000)]),
            timeout_per_file: 120,
            pool_size: 2,
            page_size: 10,
            audit_retries: 1,
            session_retry: RetryConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Retry policy for opening rendering sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first failed attempt.
    pub attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 1,
            backoff_ms: 250,
        }
    }
}

/// Which rendering engine backs the session pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Headless Chromium via puppeteer, evaluated with axe-core.
    #[default]
    Browser,
    /// Built-in markup heuristics; no browser required.
    Static,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Browser => "browser",
            EngineKind::Static => "static",
        }
    }
}

/// Rendering engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Node.js executable used by the browser engine.
    pub node_binary: String,
    /// Directory containing `puppeteer` and `axe-core`; exported as
    /// `NODE_PATH` for the driver. Defaults to `<repo>/node_modules`.
    pub node_path: Option<PathBuf>,
    /// How long a driver may take to launch its browser.
    pub startup_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Browser,
            node_binary: "node".to_string(),
            node_path: None,
            startup_timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = Config::default();
        assert!(config.exclude_dirs.contains("node_modules"));
        assert!(config.exclude_dirs.contains("DerivedData"));
        assert_eq!(config.exclude_dirs.len(), 14);
        assert_eq!(config.file_limits.get("html"), Some(&1000));
        assert_eq!(config.timeout_per_file, 120);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.audit_retries, 1);
        assert_eq!(config.session_retry.attempts, 1);
        assert_eq!(config.engine.kind, EngineKind::Browser);
    }

    #[test]
    fn test_engine_kind_serde() {
        let kind: EngineKind = serde_json::from_str("\"static\"").unwrap();
        assert_eq!(kind, EngineKind::Static);
        assert_eq!(serde_json::to_string(&EngineKind::Browser).unwrap(), "\"browser\"");
    }
}
