//! Rule frequency table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::rules::{OutcomeKind, RuleOutcome};
use crate::types::ScanResult;

/// How many files produced each outcome for one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFrequency {
    pub id: String,
    pub violations: usize,
    pub passes: usize,
    pub inapplicable: usize,
    pub incomplete: usize,
    /// Affected nodes across all violating files.
    pub violating_nodes: usize,
}

/// Collects per-rule counts from many results.
#[derive(Debug, Default)]
pub struct RuleCollector {
    by_rule: BTreeMap<String, RuleFrequency>,
}

impl RuleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count each rule at most once per bucket for this file.
    pub fn add(&mut self, result: &ScanResult) {
        let mut seen: BTreeSet<(&str, OutcomeKind)> = BTreeSet::new();
        for outcome in result.outcomes() {
            let entry = self
                .by_rule
                .entry(outcome.id.clone())
                .or_insert_with(|| RuleFrequency {
                    id: outcome.id.clone(),
                    ..RuleFrequency::default()
                });
            if outcome.is_violation() {
                entry.violating_nodes += outcome.nodes.len();
            }
            if seen.insert((outcome.id.as_str(), outcome.kind)) {
                bump(entry, outcome);
            }
        }
    }

    pub fn add_all<'a>(&mut self, results: impl IntoIterator<Item = &'a ScanResult>) {
        for result in results {
            self.add(result);
        }
    }

    pub fn get(&self, id: &str) -> Option<&RuleFrequency> {
        self.by_rule.get(id)
    }

    /// Table sorted by rule id.
    pub fn into_table(self) -> Vec<RuleFrequency> {
        self.by_rule.into_values().collect()
    }
}

fn bump(entry: &mut RuleFrequency, outcome: &RuleOutcome) {
    match outcome.kind {
        OutcomeKind::Violation => entry.violations += 1,
        OutcomeKind::Pass => entry.passes += 1,
        OutcomeKind::Inapplicable => entry.inapplicable += 1,
        OutcomeKind::Incomplete => entry.incomplete += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Impact;
    use crate::test_utils::fixtures::{sample_results, success};

    #[test]
    fn test_rule_counts() {
        let mut collector = RuleCollector::new();
        collector.add_all(&sample_results());

        let label = collector.get("label").unwrap();
        assert_eq!(label.violations, 2);
        assert_eq!(label.passes, 1);

        let image_alt = collector.get("image-alt").unwrap();
        assert_eq!(image_alt.violations, 1);
        assert_eq!(image_alt.passes, 2);
        assert_eq!(image_alt.violating_nodes, 1);
    }

    #[test]
    fn test_table_sorted_by_id() {
        let mut collector = RuleCollector::new();
        collector.add_all(&sample_results());

        let ids: Vec<_> = collector.into_table().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["document-title", "image-alt", "label"]);
    }

    #[test]
    fn test_duplicate_ids_count_once_per_file() {
        let result = success(
            "a.html",
            &[("label", Impact::Serious), ("label", Impact::Serious)],
            &[],
        );
        let mut collector = RuleCollector::new();
        collector.add(&result);

        let label = collector.get("label").unwrap();
        assert_eq!(label.violations, 1);
        assert_eq!(label.violating_nodes, 2);
    }
}
