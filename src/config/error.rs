//! Configuration error types.

use std::path::PathBuf;

/// Invalid configuration. Always fatal: raised before any scanning begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported config format for {0}: .{1}")]
    UnsupportedFormat(String, String),

    #[error("Repository root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Repository root is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),

    #[error("Repository root is not readable: {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No file extensions configured: file_limits must contain at least one entry")]
    NoFileLimits,

    #[error("Invalid file limit for '{extension}': {reason}")]
    InvalidLimit { extension: String, reason: String },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to compile exclude patterns: {0}")]
    PatternSet(#[source] ignore::Error),

    #[error("pool_size must be between 1 and {max}, got {value}")]
    InvalidPoolSize { value: usize, max: usize },

    #[error("timeout_per_file must be greater than zero")]
    InvalidTimeout,

    #[error("page_size must be greater than zero")]
    InvalidPageSize,

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
