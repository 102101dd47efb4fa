//! Discovery stage: enumerate the files to audit.
//!
//! This module handles:
//! - Directory traversal with excluded directory names pruned
//! - Gitignore-style file pattern exclusion
//! - Compound-extension matching and per-extension count limits

pub mod patterns;
pub mod targets;
pub mod walker;

pub use patterns::Exclusions;
pub use targets::{ScanTarget, compound_extension};
pub use walker::{Discovery, DiscoveryError, discover};
