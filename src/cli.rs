use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{Config, EngineKind};

#[derive(Parser, Debug)]
#[command(
    name = "a11y-audit",
    version,
    about = "Accessibility auditor for the HTML documents of a repository",
    long_about = "a11y-audit discovers HTML documents in a repository, renders each one in a headless browser, evaluates WCAG rules and writes JSON and HTML reports."
)]
pub struct Cli {
    /// Repository root to scan (overrides `repo_path` from the config file)
    pub repo_path: Option<PathBuf>,

    /// Explicit configuration file (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory that receives report.json and report.html
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Additional directory name to skip at any depth
    #[arg(long = "exclude-dir", value_name = "NAME", action = ArgAction::Append)]
    pub exclude_dirs: Vec<String>,

    /// Additional gitignore-style file pattern to skip
    #[arg(long = "exclude-pattern", value_name = "GLOB", action = ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Per-extension file limit, e.g. `html=200` (added to the configured limits)
    #[arg(long = "limit", value_name = "EXT=N", value_parser = parse_limit, action = ArgAction::Append)]
    pub limits: Vec<(String, usize)>,

    /// Per-file audit budget in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent rendering sessions
    #[arg(long, value_name = "N")]
    pub pool_size: Option<usize>,

    /// Files per page in the HTML report
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Rendering engine
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Node.js executable for the browser engine
    #[arg(long, value_name = "PATH")]
    pub node: Option<String>,

    /// CI mode: no progress bar
    #[arg(long)]
    pub ci: bool,

    /// Verbose output: list every violation and enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors and skip the terminal summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Layer command-line overrides onto a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref path) = self.repo_path {
            config.repo_path = path.clone();
        }
        if let Some(ref dir) = self.output {
            config.output_dir = dir.clone();
        }
        config.exclude_dirs.extend(self.exclude_dirs.iter().cloned());
        config
            .exclude_file_patterns
            .extend(self.exclude_patterns.iter().cloned());
        for (extension, limit) in &self.limits {
            config.file_limits.insert(extension.clone(), *limit);
        }
        if let Some(timeout) = self.timeout {
            config.timeout_per_file = timeout;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(kind) = self.engine {
            config.engine.kind = kind;
        }
        if let Some(ref node) = self.node {
            config.engine.node_binary = node.clone();
        }
    }
}

fn parse_limit(s: &str) -> Result<(String, usize), String> {
    let (extension, limit) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=N, got '{s}'"))?;
    let extension = extension.trim().trim_start_matches('.');
    if extension.is_empty() {
        return Err(format!("missing extension in '{s}'"));
    }
    let limit = limit
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid limit in '{s}': {e}"))?;
    Ok((extension.to_string(), limit))
}
