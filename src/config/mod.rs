//! Configuration layer for a11y-audit.
//!
//! This module provides configuration loading and validation:
//! - `types`: Configuration type definitions and defaults
//! - `loading`: File loading logic (YAML, JSON, TOML)
//! - `run`: The validated, immutable `RunConfig` handed to every stage

mod error;
mod loading;
mod run;
mod types;

pub use error::ConfigError;
pub use loading::PROJECT_CONFIG_FILES;
pub use run::RunConfig;
pub use types::{Config, EngineConfig, EngineKind, MAX_POOL_SIZE, RetryConfig};
