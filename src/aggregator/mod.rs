//! Aggregation stage.
//!
//! Turns the unordered per-file results of a run into an
//! [`AggregateReport`]: totals by status, severity and outcome, a rule
//! frequency table, and the per-file results in presentation order.
//! [`aggregate`] is pure; the same results in any order produce the same
//! report.

pub mod collector;
pub mod summary;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::types::ScanResult;

pub use collector::{RuleCollector, RuleFrequency};
pub use summary::{StatusCounts, Totals};

/// Everything the reporters render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub generated_at: DateTime<Utc>,
    /// Configuration the run used.
    pub config: Config,
    pub totals: Totals,
    pub rules: Vec<RuleFrequency>,
    pub per_file: Vec<ScanResult>,
}

impl AggregateReport {
    /// Results that produced at least one violation.
    pub fn files_with_violations(&self) -> impl Iterator<Item = &ScanResult> {
        self.per_file.iter().filter(|r| r.violation_count() > 0)
    }
}

/// Build the report for `results`.
pub fn aggregate(
    mut results: Vec<ScanResult>,
    config: &Config,
    generated_at: DateTime<Utc>,
) -> AggregateReport {
    results.sort_by(presentation_order);

    let totals = Totals::from_results(&results);
    let mut rules = RuleCollector::new();
    rules.add_all(&results);

    AggregateReport {
        generated_at,
        config: config.clone(),
        totals,
        rules: rules.into_table(),
        per_file: results,
    }
}

/// Most violations first, then most critical violations, then path.
pub fn presentation_order(a: &ScanResult, b: &ScanResult) -> Ordering {
    b.violation_count()
        .cmp(&a.violation_count())
        .then_with(|| b.critical_count().cmp(&a.critical_count()))
        .then_with(|| a.relative_path().cmp(b.relative_path()))
}
