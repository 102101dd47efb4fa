use serde::{Deserialize, Serialize};

/// Impact severity assigned by the rule evaluator to a violation.
///
/// Variants are declared from least to most severe so that `Ord` sorts
/// `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Impact {
    pub const ALL: [Impact; 4] = [
        Impact::Critical,
        Impact::Serious,
        Impact::Moderate,
        Impact::Minor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Serious => "serious",
            Impact::Critical => "critical",
        }
    }

    /// Parse the evaluator's impact string. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "minor" => Some(Impact::Minor),
            "moderate" => Some(Impact::Moderate),
            "serious" => Some(Impact::Serious),
            "critical" => Some(Impact::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Which bucket of the evaluator response an outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Violation,
    Pass,
    Inapplicable,
    /// The evaluator could not decide; needs manual review.
    Incomplete,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Violation => "violation",
            OutcomeKind::Pass => "pass",
            OutcomeKind::Inapplicable => "inapplicable",
            OutcomeKind::Incomplete => "incomplete",
        }
    }
}

/// A DOM node a rule was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedNode {
    /// Selector path identifying the node (one entry per frame level).
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// One rule's outcome for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub id: String,
    pub kind: OutcomeKind,
    pub description: String,
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    /// Always present for violations; optional elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<AffectedNode>,
}

impl RuleOutcome {
    pub fn is_violation(&self) -> bool {
        self.kind == OutcomeKind::Violation
    }

    /// Flattened selectors of every affected node.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .flat_map(|node| node.target.iter().map(String::as_str))
    }
}
