//! Scan target definitions.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A file selected for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTarget {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the repository root, `/`-separated.
    pub relative_path: String,
    /// File size in bytes at discovery time.
    pub size: u64,
}

impl ScanTarget {
    pub fn new(root: &Path, path: PathBuf, size: u64) -> Self {
        let relative_path = relative_path(root, &path);
        Self {
            path,
            relative_path,
            size,
        }
    }
}

/// Everything after the first dot of a file name, lower-cased.
///
/// Leading dots are not separators, so `.eslintrc.json` yields `json`.
/// `index.html` yields `html` while `c.page.html` yields `page.html`;
/// a limit on `html` therefore does not pick up `c.page.html`.
pub fn compound_extension(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim_start_matches('.');
    let (_, ext) = trimmed.split_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Render `path` relative to `root` with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
