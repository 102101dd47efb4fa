//! Count tables shared by per-file results and the aggregate report.

use crate::rules::{Impact, OutcomeKind};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Violation counts keyed by impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub serious: usize,
    pub moderate: usize,
    pub minor: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, impact: Impact) {
        match impact {
            Impact::Critical => self.critical += 1,
            Impact::Serious => self.serious += 1,
            Impact::Moderate => self.moderate += 1,
            Impact::Minor => self.minor += 1,
        }
    }

    pub fn get(&self, impact: Impact) -> usize {
        match impact {
            Impact::Critical => self.critical,
            Impact::Serious => self.serious,
            Impact::Moderate => self.moderate,
            Impact::Minor => self.minor,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.serious + self.moderate + self.minor
    }
}

impl AddAssign for SeverityCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.critical += rhs.critical;
        self.serious += rhs.serious;
        self.moderate += rhs.moderate;
        self.minor += rhs.minor;
    }
}

/// Rule outcome counts keyed by bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub violations: usize,
    pub passes: usize,
    pub inapplicable: usize,
    pub incomplete: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Violation => self.violations += 1,
            OutcomeKind::Pass => self.passes += 1,
            OutcomeKind::Inapplicable => self.inapplicable += 1,
            OutcomeKind::Incomplete => self.incomplete += 1,
        }
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.violations += rhs.violations;
        self.passes += rhs.passes;
        self.inapplicable += rhs.inapplicable;
        self.incomplete += rhs.incomplete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_record_and_total() {
        let mut counts = SeverityCounts::default();
        counts.record(Impact::Critical);
        counts.record(Impact::Critical);
        counts.record(Impact::Minor);

        assert_eq!(counts.get(Impact::Critical), 2);
        assert_eq!(counts.get(Impact::Serious), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_severity_add_assign() {
        let mut a = SeverityCounts {
            critical: 1,
            serious: 2,
            moderate: 0,
            minor: 0,
        };
        a += SeverityCounts {
            critical: 0,
            serious: 1,
            moderate: 4,
            minor: 1,
        };
        assert_eq!(
            a,
            SeverityCounts {
                critical: 1,
                serious: 3,
                moderate: 4,
                minor: 1
            }
        );
    }

    #[test]
    fn test_outcome_counts() {
        let mut counts = OutcomeCounts::default();
        counts.record(OutcomeKind::Violation);
        counts.record(OutcomeKind::Pass);
        counts.record(OutcomeKind::Pass);
        counts += OutcomeCounts {
            violations: 0,
            passes: 0,
            inapplicable: 3,
            incomplete: 1,
        };
        assert_eq!(counts.violations, 1);
        assert_eq!(counts.passes, 2);
        assert_eq!(counts.inapplicable, 3);
        assert_eq!(counts.incomplete, 1);
    }
}
