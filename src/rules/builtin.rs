//! Built-in markup heuristics used by the static engine.
//!
//! These mirror a small subset of the axe-core rule corpus closely enough to
//! audit documents when no browser is available. The output has the same
//! shape as an axe-core `run()` result so it passes through the same
//! boundary validation as browser results.

use crate::rules::types::Impact;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

const HELP_BASE: &str = "https://dequeuniversity.com/rules/axe/4.7";

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("img tag regex"));
static ALT_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\salt\s*=").expect("alt attribute regex"));
static PRESENTATION_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\srole\s*=\s*["']?(presentation|none)\b"#).expect("role regex")
});
static FORM_CONTROL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(input|select|textarea)\b[^>]*>").expect("form control regex")
});
static INPUT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\stype\s*=\s*["']?([a-z]+)"#).expect("input type regex")
});
static ARIA_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s(aria-label|aria-labelledby|title)\s*=\s*["']?[^"'\s>]"#)
        .expect("aria label regex")
});
static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sid\s*=\s*["']?([^"'\s>]+)"#).expect("id attribute regex")
});
static LABEL_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<label\b[^>]*\sfor\s*=\s*["']?([^"'\s>]+)"#).expect("label regex")
});
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<html\b[^>]*>").expect("html tag regex"));
static LANG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\slang\s*=\s*["']?[^"'\s>]+"#).expect("lang attribute regex")
});
static TITLE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("title element regex")
});

/// Outcome of a single heuristic against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Inapplicable,
    Pass(Vec<Node>),
    Violation(Vec<Node>),
}

/// A matched element, described the way the evaluator reports nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub selector: String,
    pub html: String,
    pub failure_summary: Option<String>,
}

impl Node {
    fn passing(selector: impl Into<String>, html: &str) -> Self {
        Self {
            selector: selector.into(),
            html: html.to_string(),
            failure_summary: None,
        }
    }

    fn failing(selector: impl Into<String>, html: &str, summary: &str) -> Self {
        Self {
            selector: selector.into(),
            html: html.to_string(),
            failure_summary: Some(summary.to_string()),
        }
    }
}

/// A built-in rule definition.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub impact: Impact,
    pub description: &'static str,
    pub help: &'static str,
    pub check: fn(&str) -> Check,
}

impl Rule {
    pub fn help_url(&self) -> String {
        format!("{}/{}", HELP_BASE, self.id)
    }
}

pub fn rules() -> Vec<Rule> {
    vec![image_alt(), label(), html_has_lang(), document_title()]
}

/// Run every built-in rule against `html` and return an axe-shaped result.
pub fn evaluate(html: &str) -> Value {
    let mut violations = Vec::new();
    let mut passes = Vec::new();
    let mut inapplicable = Vec::new();

    for rule in rules() {
        match (rule.check)(html) {
            Check::Inapplicable => inapplicable.push(entry(&rule, None, &[])),
            Check::Pass(nodes) => passes.push(entry(&rule, None, &nodes)),
            Check::Violation(nodes) => violations.push(entry(&rule, Some(rule.impact), &nodes)),
        }
    }

    json!({
        "violations": violations,
        "passes": passes,
        "inapplicable": inapplicable,
        "incomplete": [],
    })
}

fn entry(rule: &Rule, impact: Option<Impact>, nodes: &[Node]) -> Value {
    let nodes: Vec<Value> = nodes
        .iter()
        .map(|node| {
            json!({
                "target": [node.selector],
                "html": node.html,
                "failureSummary": node.failure_summary,
                "impact": impact.map(|i| i.as_str()),
            })
        })
        .collect();

    json!({
        "id": rule.id,
        "impact": impact.map(|i| i.as_str()),
        "description": rule.description,
        "help": rule.help,
        "helpUrl": rule.help_url(),
        "nodes": nodes,
    })
}

fn image_alt() -> Rule {
    Rule {
        id: "image-alt",
        impact: Impact::Critical,
        description: "Ensures <img> elements have alternate text or a role of none or presentation",
        help: "Images must have alternate text",
        check: check_image_alt,
    }
}

fn check_image_alt(html: &str) -> Check {
    let mut passing = Vec::new();
    let mut failing = Vec::new();

    for (i, tag) in IMG_TAG.find_iter(html).enumerate() {
        let tag = tag.as_str();
        let selector = format!("img:nth-of-type({})", i + 1);
        if ALT_ATTR.is_match(tag) || PRESENTATION_ROLE.is_match(tag) {
            passing.push(Node::passing(selector, tag));
        } else {
            failing.push(Node::failing(
                selector,
                tag,
                "Fix any of the following:\n  Element does not have an alt attribute\n  Element's default semantics were not overridden with role=\"none\" or role=\"presentation\"",
            ));
        }
    }

    classify(passing, failing)
}

fn label() -> Rule {
    Rule {
        id: "label",
        impact: Impact::Serious,
        description: "Ensures every form element has a label",
        help: "Form elements must have labels",
        check: check_label,
    }
}

fn check_label(html: &str) -> Check {
    let labelled_ids: Vec<&str> = LABEL_FOR
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let mut passing = Vec::new();
    let mut failing = Vec::new();
    let mut per_tag: [usize; 3] = [0; 3];

    for caps in FORM_CONTROL.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        let tag = whole.as_str();
        let name = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();

        let slot = match name.as_str() {
            "input" => 0,
            "select" => 1,
            _ => 2,
        };
        per_tag[slot] += 1;
        let selector = format!("{}:nth-of-type({})", name, per_tag[slot]);

        if name == "input" && !needs_label(tag) {
            continue;
        }

        let has_aria = ARIA_LABEL.is_match(tag);
        let has_for = ID_ATTR
            .captures(tag)
            .and_then(|c| c.get(1))
            .is_some_and(|id| labelled_ids.contains(&id.as_str()));

        if has_aria || has_for {
            passing.push(Node::passing(selector, tag));
        } else {
            failing.push(Node::failing(
                selector,
                tag,
                "Fix any of the following:\n  Form element does not have an implicit (wrapped) <label>\n  Form element does not have an explicit <label>\n  aria-label attribute does not exist or is empty",
            ));
        }
    }

    classify(passing, failing)
}

fn needs_label(input_tag: &str) -> bool {
    let kind = INPUT_TYPE
        .captures(input_tag)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase());

    !matches!(
        kind.as_deref(),
        Some("hidden" | "submit" | "button" | "reset" | "image")
    )
}

fn html_has_lang() -> Rule {
    Rule {
        id: "html-has-lang",
        impact: Impact::Serious,
        description: "Ensures every HTML document has a lang attribute",
        help: "<html> element must have a lang attribute",
        check: check_html_has_lang,
    }
}

fn check_html_has_lang(html: &str) -> Check {
    let Some(tag) = HTML_TAG.find(html) else {
        return Check::Inapplicable;
    };
    let tag = tag.as_str();

    if LANG_ATTR.is_match(tag) {
        Check::Pass(vec![Node::passing("html", tag)])
    } else {
        Check::Violation(vec![Node::failing(
            "html",
            tag,
            "Fix any of the following:\n  The <html> element does not have a lang attribute",
        )])
    }
}

fn document_title() -> Rule {
    Rule {
        id: "document-title",
        impact: Impact::Serious,
        description: "Ensures each HTML document contains a non-empty <title> element",
        help: "Documents must have <title> element to aid in navigation",
        check: check_document_title,
    }
}

fn check_document_title(html: &str) -> Check {
    let has_title = TITLE_ELEMENT
        .captures(html)
        .and_then(|c| c.get(1))
        .is_some_and(|t| !t.as_str().trim().is_empty());

    if has_title {
        Check::Pass(vec![Node::passing("html", "<html>")])
    } else {
        Check::Violation(vec![Node::failing(
            "html",
            "<html>",
            "Fix any of the following:\n  Document does not have a non-empty <title> element",
        )])
    }
}

fn classify(passing: Vec<Node>, failing: Vec<Node>) -> Check {
    if !failing.is_empty() {
        Check::Violation(failing)
    } else if !passing.is_empty() {
        Check::Pass(passing)
    } else {
        Check::Inapplicable
    }
}
