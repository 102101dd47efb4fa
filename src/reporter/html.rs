use crate::aggregator::AggregateReport;
use crate::reporter::Reporter;
use crate::rules::Impact;
use crate::types::ScanStatus;

/// Self-contained HTML report.
///
/// Summary cards and the rule table are rendered here. Per-file results are
/// rendered in the browser from the embedded JSON document, `page_size`
/// files per page.
pub struct HtmlReporter {
    page_size: usize,
}

impl HtmlReporter {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Reporter for HtmlReporter {
    fn report(&self, report: &AggregateReport) -> String {
        let totals = &report.totals;
        let data = serde_json::to_string(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e));

        let severity_cards: String = Impact::ALL
            .iter()
            .map(|impact| {
                format!(
                    r#"
            <div class="summary-card">
                <h3>{}</h3>
                <div class="summary-value {}">{}</div>
            </div>"#,
                    impact.as_str(),
                    impact.as_str(),
                    totals.by_severity.get(*impact)
                )
            })
            .collect();

        let status_cards: String = [
            ScanStatus::Success,
            ScanStatus::Timeout,
            ScanStatus::Error,
            ScanStatus::Skipped,
        ]
        .iter()
        .map(|status| {
            format!(
                r#"<span class="status-pill {}">{} {}</span>"#,
                status.as_str(),
                totals.by_status.get(*status),
                status.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ");

        let rule_rows: String = report
            .rules
            .iter()
            .map(|rule| {
                format!(
                    r#"
                    <tr><td><code>{}</code></td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
                    html_escape(&rule.id),
                    rule.violations,
                    rule.passes,
                    rule.inapplicable,
                    rule.incomplete
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>a11y-audit Accessibility Report</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Accessibility Report</h1>
            <div class="header-meta">
                <div><strong>Repository:</strong> {}</div>
                <div><strong>Generated:</strong> {}</div>
                <div><strong>Engine:</strong> {}</div>
            </div>
            <div class="statuses">
                {}
            </div>
        </div>

        <div class="summary">
            <div class="summary-card">
                <h3>Files</h3>
                <div class="summary-value">{}</div>
            </div>
            <div class="summary-card">
                <h3>Violations</h3>
                <div class="summary-value">{}</div>
            </div>{}
        </div>

        <div class="section">
            <h2 class="toggle" data-target="rules-table">Rules evaluated ({})</h2>
            <div id="rules-table" class="hidden">
                <table>
                    <thead><tr><th>Rule</th><th>Violations</th><th>Passes</th><th>Inapplicable</th><th>Incomplete</th></tr></thead>
                    <tbody>{}
                    </tbody>
                </table>
            </div>
        </div>

        <div class="section">
            <h2>Files</h2>
            <div class="pagination">
                <button id="prev-page" type="button">Previous</button>
                <span id="page-info"></span>
                <button id="next-page" type="button">Next</button>
            </div>
            <div id="files" data-page-size="{}"></div>
            <noscript>Enable JavaScript to browse per-file results, or open report.json.</noscript>
        </div>

        <div class="footer">
            Generated by a11y-audit v{}
        </div>
    </div>
    <script type="application/json" id="report-data">{}</script>
    <script>{SCRIPT}</script>
</body>
</html>"#,
            html_escape(&report.config.repo_path.display().to_string()),
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.config.engine.kind.as_str(),
            status_cards,
            totals.files,
            totals.by_severity.total(),
            severity_cards,
            report.rules.len(),
            rule_rows,
            self.page_size,
            env!("CARGO_PKG_VERSION"),
            embed_json(&data),
        )
    }
}

/// Make serialized JSON safe to place inside a `<script>` element.
///
/// `<` only occurs inside JSON strings, where `\u003c` decodes to the same
/// character.
fn embed_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
        :root {
            --critical: #dc2626;
            --serious: #ea580c;
            --moderate: #ca8a04;
            --minor: #2563eb;
            --success: #16a34a;
            --muted: #6b7280;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #1f2937;
            background: #f3f4f6;
            padding: 2rem;
        }
        .container { max-width: 1200px; margin: 0 auto; }
        .header, .section, .summary-card, .file {
            background: white;
            border-radius: 12px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        .header, .section { padding: 2rem; margin-bottom: 2rem; }
        .header h1 { font-size: 1.75rem; margin-bottom: 0.5rem; }
        .header-meta { color: var(--muted); font-size: 0.9rem; }
        .statuses { margin-top: 1rem; display: flex; gap: 0.5rem; flex-wrap: wrap; }
        .status-pill { padding: 0.25rem 0.75rem; border-radius: 9999px; font-weight: 600; background: #e5e7eb; }
        .status-pill.success { background: #dcfce7; color: var(--success); }
        .status-pill.timeout, .status-pill.error { background: #fee2e2; color: var(--critical); }
        .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .summary-card { padding: 1.5rem; }
        .summary-card h3 { font-size: 0.875rem; color: var(--muted); text-transform: uppercase; margin-bottom: 0.5rem; }
        .summary-value { font-size: 2rem; font-weight: 700; }
        .summary-value.critical { color: var(--critical); }
        .summary-value.serious { color: var(--serious); }
        .summary-value.moderate { color: var(--moderate); }
        .summary-value.minor { color: var(--minor); }
        h2 { font-size: 1.25rem; margin-bottom: 1rem; }
        .toggle { cursor: pointer; }
        .toggle::before { content: '\25B8  '; }
        .hidden { display: none; }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; }
        td.num { text-align: right; }
        .pagination { display: flex; align-items: center; gap: 1rem; margin-bottom: 1rem; }
        .pagination button { padding: 0.4rem 1rem; border-radius: 6px; border: 1px solid #d1d5db; background: white; cursor: pointer; }
        .pagination button:disabled { opacity: 0.4; cursor: default; }
        .file { border: 1px solid #e5e7eb; margin-bottom: 1rem; padding: 1rem 1.5rem; }
        .file h3 { font-size: 1rem; font-family: monospace; }
        .file .meta { color: var(--muted); font-size: 0.85rem; }
        .violation { border-left: 4px solid var(--muted); padding: 0.5rem 1rem; margin-top: 0.75rem; background: #f9fafb; }
        .violation.critical { border-left-color: var(--critical); }
        .violation.serious { border-left-color: var(--serious); }
        .violation.moderate { border-left-color: var(--moderate); }
        .violation.minor { border-left-color: var(--minor); }
        .impact { font-weight: 700; text-transform: uppercase; font-size: 0.75rem; }
        pre { background: #1f2937; color: #f9fafb; padding: 0.5rem; border-radius: 6px; overflow-x: auto; font-size: 0.8rem; white-space: pre-wrap; }
        .error-message { color: var(--critical); }
        .footer { text-align: center; color: var(--muted); font-size: 0.875rem; }
"#;

const SCRIPT: &str = r#"
(function () {
  'use strict';
  const report = JSON.parse(document.getElementById('report-data').textContent);
  const container = document.getElementById('files');
  const pageSize = Math.max(1, parseInt(container.dataset.pageSize, 10) || 10);
  const files = report.perFile || [];
  const pages = Math.max(1, Math.ceil(files.length / pageSize));
  let page = 0;

  function el(tag, className, text) {
    const node = document.createElement(tag);
    if (className) node.className = className;
    if (text !== undefined && text !== null) node.textContent = text;
    return node;
  }

  function renderOutcome(outcome, kind) {
    const box = el('div', 'violation ' + (outcome.impact || ''));
    const title = el('div');
    if (outcome.impact) title.appendChild(el('span', 'impact', outcome.impact + ' '));
    title.appendChild(el('strong', null, outcome.id));
    title.appendChild(document.createTextNode(' ' + (outcome.help || '')));
    box.appendChild(title);
    if (kind === 'incomplete') box.appendChild(el('div', 'meta', 'Needs manual review'));
    if (outcome.helpUrl) {
      const link = el('a', null, 'Learn more');
      link.href = outcome.helpUrl;
      link.target = '_blank';
      link.rel = 'noopener';
      box.appendChild(link);
    }
    (outcome.nodes || []).forEach(function (node) {
      box.appendChild(el('div', 'meta', 'Target: ' + (node.target || []).join(', ')));
      if (node.html) box.appendChild(el('pre', null, node.html));
      if (node.failureSummary) box.appendChild(el('pre', null, node.failureSummary));
    });
    return box;
  }

  function renderFile(result) {
    const card = el('div', 'file');
    card.appendChild(el('h3', null, result.target.relativePath));
    card.appendChild(el('div', 'meta',
      result.status + ' · ' + result.violations.length + ' violations · ' +
      result.passes.length + ' passes · ' + result.durationMs + ' ms'));
    if (result.error) card.appendChild(el('div', 'error-message', result.error));
    result.violations.forEach(function (v) { card.appendChild(renderOutcome(v, 'violation')); });
    result.incomplete.forEach(function (v) { card.appendChild(renderOutcome(v, 'incomplete')); });
    return card;
  }

  function show(next) {
    page = Math.min(Math.max(next, 0), pages - 1);
    container.replaceChildren();
    files.slice(page * pageSize, (page + 1) * pageSize).forEach(function (result) {
      container.appendChild(renderFile(result));
    });
    if (files.length === 0) container.appendChild(el('div', 'meta', 'No files were scanned.'));
    document.getElementById('page-info').textContent = 'Page ' + (page + 1) + ' of ' + pages;
    document.getElementById('prev-page').disabled = page === 0;
    document.getElementById('next-page').disabled = page >= pages - 1;
  }

  document.getElementById('prev-page').addEventListener('click', function () { show(page - 1); });
  document.getElementById('next-page').addEventListener('click', function () { show(page + 1); });
  document.querySelectorAll('.toggle').forEach(function (toggle) {
    toggle.addEventListener('click', function () {
      document.getElementById(toggle.dataset.target).classList.toggle('hidden');
    });
  });
  show(0);
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::config::Config;
    use crate::rules::RuleOutcome;
    use crate::test_utils::fixtures::sample_results;
    use chrono::{TimeZone, Utc};

    fn sample_report() -> AggregateReport {
        aggregate(
            sample_results(),
            &Config::default(),
            Utc.with_ymd_and_hms(2026, 1, 25, 12, 0, 0).unwrap(),
        )
    }

    fn embedded_json(output: &str) -> serde_json::Value {
        let start_tag = r#"<script type="application/json" id="report-data">"#;
        let start = output.find(start_tag).unwrap() + start_tag.len();
        let end = start + output[start..].find("</script>").unwrap();
        serde_json::from_str(&output[start..end]).unwrap()
    }

    #[test]
    fn test_html_output_structure() {
        let output = HtmlReporter::new(10).report(&sample_report());

        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("a11y-audit Accessibility Report"));
        assert!(output.contains(r#"data-page-size="10""#));
        assert!(output.contains("2026-01-25 12:00:00 UTC"));
        assert!(output.contains("<code>image-alt</code>"));
    }

    #[test]
    fn test_embedded_json_matches_report() {
        let report = sample_report();
        let output = HtmlReporter::default().report(&report);

        let embedded = embedded_json(&output);
        assert_eq!(embedded, serde_json::to_value(&report).unwrap());
    }

    #[test]
    fn test_script_content_cannot_close_tag() {
        let mut report = sample_report();
        let mut outcome: RuleOutcome = report.per_file[0].violations[0].clone();
        outcome.nodes[0].html = Some("</script><script>alert('xss')</script>".to_string());
        report.per_file[0].violations[0] = outcome;

        let output = HtmlReporter::default().report(&report);
        assert!(!output.contains("</script><script>alert"));

        let embedded = embedded_json(&output);
        assert_eq!(
            embedded["perFile"][0]["violations"][0]["nodes"][0]["html"],
            "</script><script>alert('xss')</script>"
        );
    }

    #[test]
    fn test_repo_path_is_escaped() {
        let mut report = sample_report();
        report.config.repo_path = "/tmp/<b>repo</b>".into();

        let output = HtmlReporter::default().report(&report);
        assert!(output.contains("/tmp/&lt;b&gt;repo&lt;/b&gt;"));
    }

    #[test]
    fn test_page_size_floor() {
        let output = HtmlReporter::new(0).report(&sample_report());
        assert!(output.contains(r#"data-page-size="1""#));
    }
}
