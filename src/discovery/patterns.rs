//! Directory and file-name exclusions applied during discovery.

use crate::config::ConfigError;
use globset::GlobBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeSet;
use std::path::Path;

/// Compiled exclusion rules.
///
/// Directory names prune a walk at any depth. File patterns use gitignore
/// glob syntax: a pattern without a slash (`*.spec.html`) matches the file
/// name anywhere in the tree, a pattern with a slash is anchored at the root.
#[derive(Debug, Clone)]
pub struct Exclusions {
    dirs: BTreeSet<String>,
    patterns: Gitignore,
}

impl Exclusions {
    pub fn new(dirs: &BTreeSet<String>, patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            check_glob(pattern)?;
            builder
                .add_line(None, pattern)
                .map_err(ConfigError::PatternSet)?;
        }
        let patterns = builder.build().map_err(ConfigError::PatternSet)?;

        Ok(Self {
            dirs: dirs.clone(),
            patterns,
        })
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// Check a file path relative to the repository root.
    pub fn is_excluded_file(&self, relative: &Path) -> bool {
        self.patterns.matched(relative, false).is_ignore()
    }

    /// True when any directory component of `relative` is excluded or the
    /// file itself matches a pattern.
    pub fn excludes(&self, relative: &Path) -> bool {
        let mut components: Vec<_> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        components.pop();
        components.iter().any(|c| self.is_excluded_dir(c)) || self.is_excluded_file(relative)
    }
}

/// Gitignore compilation treats a malformed glob such as `a[b` as literal
/// text, so each pattern is parsed strictly first.
fn check_glob(pattern: &str) -> Result<(), ConfigError> {
    let glob = pattern.strip_prefix('!').unwrap_or(pattern);
    let glob = glob.trim_start_matches('/').trim_end_matches('/');
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exclusions(dirs: &[&str], patterns: &[&str]) -> Exclusions {
        let dirs = dirs.iter().map(|d| d.to_string()).collect();
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        Exclusions::new(&dirs, &patterns).unwrap()
    }

    #[test]
    fn test_dir_names() {
        let ex = exclusions(&["node_modules", ".git"], &[]);
        assert!(ex.is_excluded_dir("node_modules"));
        assert!(!ex.is_excluded_dir("src"));
        assert!(!ex.is_excluded_dir("Node_Modules"));
    }

    #[test]
    fn test_file_pattern_matches_any_depth() {
        let ex = exclusions(&[], &["*.spec.html"]);
        assert!(ex.is_excluded_file(Path::new("form.spec.html")));
        assert!(ex.is_excluded_file(Path::new("src/app/form.spec.html")));
        assert!(!ex.is_excluded_file(Path::new("src/app/form.html")));
    }

    #[test]
    fn test_anchored_pattern() {
        let ex = exclusions(&[], &["legacy/*.html"]);
        assert!(ex.is_excluded_file(Path::new("legacy/old.html")));
        assert!(!ex.is_excluded_file(Path::new("src/legacy/old.html")));
    }

    #[test]
    fn test_excludes_checks_parents() {
        let ex = exclusions(&["dist"], &["*.d.ts"]);
        assert!(ex.excludes(Path::new("dist/index.html")));
        assert!(ex.excludes(Path::new("a/b/dist/c/index.html")));
        assert!(ex.excludes(Path::new("types/index.d.ts")));
        assert!(!ex.excludes(Path::new("src/dist.html")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = Exclusions::new(&BTreeSet::new(), &["a[".to_string()]);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_unclosed_class_names_the_pattern() {
        let patterns = vec!["*.spec.html".to_string(), "a[b".to_string()];
        match Exclusions::new(&BTreeSet::new(), &patterns) {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "a[b"),
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_gitignore_forms_are_accepted() {
        let ex = exclusions(&[], &["!keep.html", "/root.html", "build/", "**/gen/*.html"]);
        assert!(ex.is_excluded_file(Path::new("root.html")));
        assert!(ex.is_excluded_file(Path::new("a/gen/x.html")));
    }
}
