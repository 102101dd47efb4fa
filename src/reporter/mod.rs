pub mod html;
pub mod json;
pub mod progress;
pub mod terminal;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregator::AggregateReport;
use crate::error::{Result, ScanError};

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use progress::ScanProgress;
pub use terminal::TerminalReporter;

pub trait Reporter {
    fn report(&self, report: &AggregateReport) -> String;
}

pub const JSON_REPORT: &str = "report.json";
pub const HTML_REPORT: &str = "report.html";

/// Paths of the written artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReports {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Writes `report.json` and `report.html` into an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    page_size: usize,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            page_size,
        }
    }

    pub fn write(&self, report: &AggregateReport) -> Result<WrittenReports> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ScanError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let json = self.output_dir.join(JSON_REPORT);
        let body = serde_json::to_string_pretty(report)?;
        write_file(&json, &body)?;

        let html = self.output_dir.join(HTML_REPORT);
        write_file(&html, &HtmlReporter::new(self.page_size).report(report))?;

        info!(json = %json.display(), html = %html.display(), "Reports written");
        Ok(WrittenReports { json, html })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::config::Config;
    use crate::test_utils::fixtures::sample_results;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("reports");
        let report = aggregate(sample_results(), &Config::default(), Utc::now());

        let written = ReportGenerator::new(&out, 10).write(&report).unwrap();

        assert_eq!(written.json, out.join(JSON_REPORT));
        let json = fs::read_to_string(&written.json).unwrap();
        assert_eq!(json, JsonReporter::new().report(&report));
        let html = fs::read_to_string(&written.html).unwrap();
        assert!(html.contains("report-data"));
    }

    #[test]
    fn test_write_fails_when_output_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("reports");
        fs::write(&blocker, "not a directory").unwrap();
        let report = aggregate(Vec::new(), &Config::default(), Utc::now());

        let err = ReportGenerator::new(&blocker, 10).write(&report).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
