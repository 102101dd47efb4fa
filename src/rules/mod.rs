pub mod builtin;
pub mod types;

pub use types::{AffectedNode, Impact, OutcomeKind, RuleOutcome};
