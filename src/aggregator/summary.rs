//! Run totals.

use serde::{Deserialize, Serialize};

use crate::types::{OutcomeCounts, ScanResult, ScanStatus, SeverityCounts};

/// Number of files per terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub success: usize,
    pub timeout: usize,
    pub error: usize,
    pub skipped: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ScanStatus) {
        match status {
            ScanStatus::Success => self.success += 1,
            ScanStatus::Timeout => self.timeout += 1,
            ScanStatus::Error => self.error += 1,
            ScanStatus::Skipped => self.skipped += 1,
        }
    }

    pub fn get(&self, status: ScanStatus) -> usize {
        match status {
            ScanStatus::Success => self.success,
            ScanStatus::Timeout => self.timeout,
            ScanStatus::Error => self.error,
            ScanStatus::Skipped => self.skipped,
        }
    }
}

/// Exact sums over every per-file result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub files: usize,
    pub by_status: StatusCounts,
    /// Violations by impact, across all files.
    pub by_severity: SeverityCounts,
    pub outcomes: OutcomeCounts,
}

impl Totals {
    pub fn add(&mut self, result: &ScanResult) {
        self.files += 1;
        self.by_status.record(result.status);
        self.by_severity += result.severity_counts();
        self.outcomes += result.outcome_counts();
    }

    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ScanResult>) -> Self {
        let mut totals = Self::default();
        for result in results {
            totals.add(result);
        }
        totals
    }

    /// Files that did not produce a usable audit.
    pub fn failed(&self) -> usize {
        self.by_status.timeout + self.by_status.error
    }
}
