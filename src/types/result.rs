//! Per-file scan results.

use crate::discovery::ScanTarget;
use crate::engine::AuditOutcome;
use crate::rules::{Impact, RuleOutcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::counts::{OutcomeCounts, SeverityCounts};

/// Terminal status of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Success,
    Timeout,
    Error,
    /// Not scanned because the run was cancelled first.
    Skipped,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Success => "success",
            ScanStatus::Timeout => "timeout",
            ScanStatus::Error => "error",
            ScanStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of auditing one target. Built once by the orchestrator and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub target: ScanTarget,
    pub status: ScanStatus,
    pub violations: Vec<RuleOutcome>,
    pub passes: Vec<RuleOutcome>,
    pub inapplicable: Vec<RuleOutcome>,
    pub incomplete: Vec<RuleOutcome>,
    pub duration_ms: u64,
    /// Number of audit attempts made (0 when skipped).
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    pub fn success(target: ScanTarget, outcome: AuditOutcome, elapsed: Duration, attempts: u32) -> Self {
        Self {
            target,
            status: ScanStatus::Success,
            violations: outcome.violations,
            passes: outcome.passes,
            inapplicable: outcome.inapplicable,
            incomplete: outcome.incomplete,
            duration_ms: millis(elapsed),
            attempts,
            error: None,
        }
    }

    /// A timed-out audit. The recorded duration is the budget itself.
    pub fn timeout(target: ScanTarget, budget: Duration, attempts: u32) -> Self {
        Self {
            error: Some(format!(
                "audit did not complete within {}s",
                budget.as_secs_f64()
            )),
            duration_ms: millis(budget),
            ..Self::empty(target, ScanStatus::Timeout, attempts)
        }
    }

    pub fn error(target: ScanTarget, message: impl Into<String>, elapsed: Duration, attempts: u32) -> Self {
        Self {
            error: Some(message.into()),
            duration_ms: millis(elapsed),
            ..Self::empty(target, ScanStatus::Error, attempts)
        }
    }

    pub fn skipped(target: ScanTarget) -> Self {
        Self::empty(target, ScanStatus::Skipped, 0)
    }

    fn empty(target: ScanTarget, status: ScanStatus, attempts: u32) -> Self {
        Self {
            target,
            status,
            violations: Vec::new(),
            passes: Vec::new(),
            inapplicable: Vec::new(),
            incomplete: Vec::new(),
            duration_ms: 0,
            attempts,
            error: None,
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.target.relative_path
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Violations broken down by impact.
    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for impact in self.violations.iter().filter_map(|v| v.impact) {
            counts.record(impact);
        }
        counts
    }

    pub fn critical_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.impact == Some(Impact::Critical))
            .count()
    }

    pub fn outcome_counts(&self) -> OutcomeCounts {
        OutcomeCounts {
            violations: self.violations.len(),
            passes: self.passes.len(),
            inapplicable: self.inapplicable.len(),
            incomplete: self.incomplete.len(),
        }
    }

    /// Every outcome of this file, across all buckets.
    pub fn outcomes(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.violations
            .iter()
            .chain(&self.passes)
            .chain(&self.inapplicable)
            .chain(&self.incomplete)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
