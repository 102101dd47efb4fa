//! Property-based tests for discovery.
//!
//! Invariants that hold for every generated repository tree:
//! - No target lives under an excluded directory or matches an excluded pattern
//! - Exactly `min(N, L)` targets are returned for one limited extension
//! - Discovery is deterministic

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use a11y_audit::discovery::Exclusions;
use a11y_audit::{Config, discover};
use proptest::prelude::*;
use tempfile::TempDir;

const EXCLUDED_DIRS: [&str; 2] = ["node_modules", "dist"];

fn dir_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("node_modules".to_string()),
        Just("dist".to_string()),
        Just("src".to_string()),
        Just("app".to_string()),
        "[a-z]{1,4}",
    ]
}

fn file_name() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,6}",
        prop_oneof![
            Just("html"),
            Just("page.html"),
            Just("htm"),
            Just("spec.ts"),
            Just("txt"),
        ],
    )
        .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
}

fn tree() -> impl Strategy<Value = BTreeSet<PathBuf>> {
    prop::collection::btree_set(
        (prop::collection::vec(dir_segment(), 0..3), file_name()).prop_map(|(dirs, name)| {
            let mut path: PathBuf = dirs.into_iter().collect();
            path.push(name);
            path
        }),
        0..40,
    )
}

fn is_eligible(path: &Path) -> bool {
    let excluded = path
        .iter()
        .any(|c| EXCLUDED_DIRS.iter().any(|d| c.to_str() == Some(*d)));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    !excluded && name.ends_with(".html") && !name.ends_with(".page.html")
}

fn run_discovery(root: &Path, limit: usize) -> Vec<String> {
    let mut config = Config::default();
    config.repo_path = root.to_path_buf();
    config.exclude_dirs = EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect();
    config.exclude_file_patterns = vec!["*.page.html".to_string()];
    config.file_limits = [("html".to_string(), limit)].into_iter().collect();
    let config = config.validate().unwrap();

    discover(&config)
        .unwrap()
        .targets
        .into_iter()
        .map(|t| t.relative_path)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_excluded_paths_never_discovered(paths in tree(), limit in 1usize..50) {
        let dir = TempDir::new().unwrap();
        for path in &paths {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, "<html></html>").unwrap();
        }

        let found = run_discovery(dir.path(), limit);
        let dirs = EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect();
        let exclusions = Exclusions::new(&dirs, &["*.page.html".to_string()]).unwrap();

        for relative in &found {
            prop_assert!(!exclusions.excludes(Path::new(relative)), "excluded path {}", relative);
            prop_assert!(
                !relative.split('/').any(|c| EXCLUDED_DIRS.contains(&c)),
                "excluded directory in {}", relative
            );
            prop_assert!(!relative.ends_with(".page.html"), "excluded pattern in {}", relative);
        }
    }

    #[test]
    fn prop_limit_yields_min_of_available_and_limit(paths in tree(), limit in 1usize..50) {
        let dir = TempDir::new().unwrap();
        for path in &paths {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, "<html></html>").unwrap();
        }
        let available = paths.iter().filter(|p| is_eligible(p)).count();

        let found = run_discovery(dir.path(), limit);

        prop_assert_eq!(found.len(), available.min(limit));
        let unique: BTreeSet<_> = found.iter().collect();
        prop_assert_eq!(unique.len(), found.len());
    }

    #[test]
    fn prop_discovery_is_deterministic(paths in tree()) {
        let dir = TempDir::new().unwrap();
        for path in &paths {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, "<html></html>").unwrap();
        }

        prop_assert_eq!(run_discovery(dir.path(), 25), run_discovery(dir.path(), 25));
    }
}
