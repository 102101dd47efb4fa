//! Validated, immutable run configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::discovery::Exclusions;

use super::error::ConfigError;
use super::types::{Config, EngineConfig, MAX_POOL_SIZE, RetryConfig};

/// A checked [`Config`] plus its compiled exclusion matchers.
///
/// Built once by [`Config::validate`] and passed by reference into every
/// pipeline stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    config: Config,
    exclusions: Exclusions,
}

impl Config {
    /// Check every field and resolve the repository root.
    pub fn validate(mut self) -> Result<RunConfig, ConfigError> {
        self.repo_path = resolve_root(&self.repo_path)?;

        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::InvalidPoolSize {
                value: self.pool_size,
                max: MAX_POOL_SIZE,
            });
        }
        if self.timeout_per_file == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if self.engine.node_binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "engine.node_binary",
                value: self.engine.node_binary.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        self.file_limits = normalize_limits(self.file_limits)?;
        let exclusions = Exclusions::new(&self.exclude_dirs, &self.exclude_file_patterns)?;

        Ok(RunConfig {
            config: self,
            exclusions,
        })
    }
}

impl RunConfig {
    /// The configuration as used for this run, embedded in reports.
    pub fn snapshot(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.repo_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn file_limits(&self) -> &BTreeMap<String, usize> {
        &self.config.file_limits
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_per_file)
    }

    pub fn pool_size(&self) -> usize {
        self.config.pool_size
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn audit_retries(&self) -> u32 {
        self.config.audit_retries
    }

    pub fn session_retry(&self) -> &RetryConfig {
        &self.config.session_retry
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.config.engine
    }

    /// `NODE_PATH` for the browser driver.
    pub fn node_path(&self) -> PathBuf {
        self.config
            .engine
            .node_path
            .clone()
            .unwrap_or_else(|| self.root().join("node_modules"))
    }
}

fn resolve_root(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::RootNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ConfigError::RootNotADirectory(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|source| ConfigError::RootUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    fs::canonicalize(path).map_err(|source| ConfigError::RootUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Lower-case extensions and strip a leading dot (`".HTML"` becomes `"html"`).
fn normalize_limits(limits: BTreeMap<String, usize>) -> Result<BTreeMap<String, usize>, ConfigError> {
    if limits.is_empty() {
        return Err(ConfigError::NoFileLimits);
    }

    let mut normalized = BTreeMap::new();
    for (extension, limit) in limits {
        let key = extension.trim().trim_start_matches('.').to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::InvalidLimit {
                extension,
                reason: "extension must not be empty".to_string(),
            });
        }
        if limit == 0 {
            return Err(ConfigError::InvalidLimit {
                extension,
                reason: "limit must be at least 1".to_string(),
            });
        }
        if normalized.insert(key, limit).is_some() {
            return Err(ConfigError::InvalidLimit {
                extension,
                reason: "extension listed more than once".to_string(),
            });
        }
    }
    Ok(normalized)
}
