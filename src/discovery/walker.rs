//! Repository walk that turns a [`RunConfig`] into an ordered target list.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{ConfigError, RunConfig};

use super::patterns::Exclusions;
use super::targets::{ScanTarget, compound_extension};

/// A path the walk could not read. The rest of the tree is still scanned.
#[derive(Debug, thiserror::Error)]
#[error("Skipped unreadable path {}: {source}", path.display())]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// Result of walking the repository.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Selected targets, sorted by relative path.
    pub targets: Vec<ScanTarget>,
    /// Subtrees or files that could not be read.
    pub skipped: Vec<DiscoveryError>,
    /// Candidates dropped by the per-extension limit, keyed by extension.
    pub truncated: BTreeMap<String, usize>,
}

/// Walk `config.root()` and select the files to audit.
///
/// Candidates are files whose compound extension has an entry in the limits
/// table and that no exclusion matches. They are sorted by relative path,
/// deduplicated, and cut to the first `limit` of each extension.
pub fn discover(config: &RunConfig) -> Result<Discovery, ConfigError> {
    let root = config.root();
    let exclusions = config.exclusions();
    let limits = config.file_limits();

    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, exclusions));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ConfigError::RootUnreadable {
                    path: root.to_path_buf(),
                    source: err.into(),
                });
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                let error = DiscoveryError { path, source: err };
                warn!(error = %error, "Skipping unreadable path");
                skipped.push(error);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(extension) = entry.file_name().to_str().and_then(compound_extension) else {
            continue;
        };
        if !limits.contains_key(&extension) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if exclusions.is_excluded_file(relative) {
            debug!(path = %relative.display(), "Excluded by file pattern");
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                let error = DiscoveryError {
                    path: entry.path().to_path_buf(),
                    source: err,
                };
                warn!(error = %error, "Skipping unreadable file");
                skipped.push(error);
                continue;
            }
        };

        candidates.push((extension, ScanTarget::new(root, entry.into_path(), size)));
    }

    let (targets, truncated) = apply_limits(candidates, limits);

    info!(
        root = %root.display(),
        targets = targets.len(),
        skipped = skipped.len(),
        "Discovery complete"
    );
    for (extension, dropped) in &truncated {
        info!(extension = %extension, dropped, "File limit reached");
    }

    Ok(Discovery {
        targets,
        skipped,
        truncated,
    })
}

fn is_pruned(entry: &DirEntry, exclusions: &Exclusions) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclusions.is_excluded_dir(name))
}

/// Sort, deduplicate and keep the first `limit` candidates per extension.
fn apply_limits(
    mut candidates: Vec<(String, ScanTarget)>,
    limits: &BTreeMap<String, usize>,
) -> (Vec<ScanTarget>, BTreeMap<String, usize>) {
    candidates.sort_by(|a, b| a.1.relative_path.cmp(&b.1.relative_path));
    candidates.dedup_by(|a, b| a.1.relative_path == b.1.relative_path);

    let mut taken: BTreeMap<&str, usize> = BTreeMap::new();
    let mut truncated = BTreeMap::new();
    let mut targets = Vec::with_capacity(candidates.len());

    for (extension, target) in &candidates {
        let limit = limits.get(extension).copied().unwrap_or(0);
        let count = taken.entry(extension.as_str()).or_default();
        if *count < limit {
            *count += 1;
            targets.push(target.clone());
        } else {
            *truncated.entry(extension.clone()).or_default() += 1;
        }
    }

    (targets, truncated)
}
