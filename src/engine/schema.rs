//! Strict validation of rule evaluator responses.
//!
//! The evaluator runs outside our control (a browser page, a Node driver),
//! so its output is untyped JSON until it passes [`parse_audit_response`].
//! Anything that does not match the expected shape is rejected as
//! [`AuditError::Malformed`] instead of being partially accepted.

use serde_json::{Map, Value};

use crate::rules::{AffectedNode, Impact, OutcomeKind, RuleOutcome};

use super::error::AuditError;

/// A validated evaluator response, split by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutcome {
    pub violations: Vec<RuleOutcome>,
    pub passes: Vec<RuleOutcome>,
    pub inapplicable: Vec<RuleOutcome>,
    pub incomplete: Vec<RuleOutcome>,
}

/// Validate `raw` and convert it into an [`AuditOutcome`].
///
/// Required shape: an object with `violations`, `passes` and `inapplicable`
/// arrays plus an optional `incomplete` array. Every entry needs a string
/// `id`. Violations need a known `impact` and a `nodes` array whose entries
/// each carry a `target` array.
pub fn parse_audit_response(raw: &Value) -> Result<AuditOutcome, AuditError> {
    let object = raw
        .as_object()
        .ok_or_else(|| malformed("response", "expected an object"))?;

    Ok(AuditOutcome {
        violations: bucket(object, "violations", OutcomeKind::Violation, true)?,
        passes: bucket(object, "passes", OutcomeKind::Pass, true)?,
        inapplicable: bucket(object, "inapplicable", OutcomeKind::Inapplicable, true)?,
        incomplete: bucket(object, "incomplete", OutcomeKind::Incomplete, false)?,
    })
}

fn malformed(path: &str, reason: &str) -> AuditError {
    AuditError::Malformed(format!("{path}: {reason}"))
}

fn bucket(
    object: &Map<String, Value>,
    key: &str,
    kind: OutcomeKind,
    required: bool,
) -> Result<Vec<RuleOutcome>, AuditError> {
    match object.get(key) {
        None | Some(Value::Null) if !required => Ok(Vec::new()),
        None => Err(malformed(key, "missing")),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| outcome(entry, kind, &format!("{key}[{i}]")))
            .collect(),
        Some(_) => Err(malformed(key, "expected an array")),
    }
}

fn outcome(value: &Value, kind: OutcomeKind, path: &str) -> Result<RuleOutcome, AuditError> {
    let entry = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))?;

    let id = match entry.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(malformed(&format!("{path}.id"), "expected a non-empty string")),
    };

    let impact = match optional_string(entry, "impact", path)? {
        Some(raw) => Some(Impact::parse(&raw).ok_or_else(|| {
            malformed(
                &format!("{path}.impact"),
                "expected one of minor, moderate, serious, critical",
            )
        })?),
        None if kind == OutcomeKind::Violation => {
            return Err(malformed(&format!("{path}.impact"), "missing"));
        }
        None => None,
    };

    let nodes = match entry.get("nodes") {
        Some(Value::Array(nodes)) => nodes
            .iter()
            .enumerate()
            .map(|(i, node)| affected_node(node, &format!("{path}.nodes[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        None | Some(Value::Null) if kind != OutcomeKind::Violation => Vec::new(),
        _ => return Err(malformed(&format!("{path}.nodes"), "expected an array")),
    };

    Ok(RuleOutcome {
        id,
        kind,
        description: optional_string(entry, "description", path)?.unwrap_or_default(),
        help: optional_string(entry, "help", path)?.unwrap_or_default(),
        help_url: optional_string(entry, "helpUrl", path)?,
        impact,
        nodes,
    })
}

fn affected_node(value: &Value, path: &str) -> Result<AffectedNode, AuditError> {
    let node = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))?;

    let target = match node.get("target") {
        Some(Value::Array(parts)) => parts
            .iter()
            .enumerate()
            .map(|(i, part)| selector(part, &format!("{path}.target[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(malformed(&format!("{path}.target"), "expected an array")),
    };

    Ok(AffectedNode {
        target,
        html: optional_string(node, "html", path)?,
        failure_summary: optional_string(node, "failureSummary", path)?,
    })
}

/// A selector is a string, or an array of strings for shadow DOM paths.
fn selector(value: &Value, path: &str) -> Result<String, AuditError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(parts) => parts
            .iter()
            .map(|part| {
                part.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(path, "expected a string selector"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(" >>> ")),
        _ => Err(malformed(path, "expected a string selector")),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, AuditError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(malformed(&format!("{path}.{key}"), "expected a string")),
    }
}
