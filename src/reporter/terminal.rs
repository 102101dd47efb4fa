use crate::aggregator::AggregateReport;
use crate::reporter::Reporter;
use crate::rules::Impact;
use crate::types::{ScanResult, ScanStatus};
use colored::Colorize;

/// Files listed in the summary unless verbose.
const DEFAULT_TOP_FILES: usize = 10;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn impact_color(&self, impact: Impact) -> colored::ColoredString {
        let label = format!("[{}]", impact);
        match impact {
            Impact::Critical => label.red().bold(),
            Impact::Serious => label.yellow().bold(),
            Impact::Moderate => label.cyan(),
            Impact::Minor => label.white(),
        }
    }

    fn status_color(&self, status: ScanStatus) -> colored::ColoredString {
        let label = status.as_str();
        match status {
            ScanStatus::Success => label.green(),
            ScanStatus::Timeout => label.yellow().bold(),
            ScanStatus::Error => label.red().bold(),
            ScanStatus::Skipped => label.dimmed(),
        }
    }

    fn format_file(&self, result: &ScanResult) -> String {
        let counts = result.severity_counts();
        let mut output = format!(
            "  {} {} ({} critical, {} serious, {} moderate, {} minor)\n",
            result.violation_count().to_string().bold(),
            result.relative_path(),
            counts.critical,
            counts.serious,
            counts.moderate,
            counts.minor
        );

        if self.verbose {
            for violation in &result.violations {
                let impact = violation
                    .impact
                    .map(|i| self.impact_color(i).to_string())
                    .unwrap_or_default();
                output.push_str(&format!(
                    "      {} {}: {}\n",
                    impact,
                    violation.id,
                    violation.help
                ));
                for selector in violation.selectors() {
                    output.push_str(&format!("          {}\n", selector.dimmed()));
                }
            }
        }
        output
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &AggregateReport) -> String {
        let totals = &report.totals;
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!(
                "a11y-audit v{} - Accessibility Auditor",
                env!("CARGO_PKG_VERSION")
            )
            .bold()
        ));
        output.push_str(&format!(
            "Scanned: {}\n",
            report.config.repo_path.display()
        ));
        output.push_str(&format!(
            "Files: {} ({} success, {} timeout, {} error, {} skipped)\n\n",
            totals.files,
            totals.by_status.success.to_string().green(),
            totals.by_status.timeout.to_string().yellow(),
            totals.by_status.error.to_string().red(),
            totals.by_status.skipped
        ));

        let with_violations: Vec<_> = report.files_with_violations().collect();
        if with_violations.is_empty() {
            output.push_str(&"No accessibility violations found.\n".green().to_string());
        } else {
            output.push_str(&format!("{}\n", "Files with violations:".bold()));
            let shown = if self.verbose {
                with_violations.len()
            } else {
                DEFAULT_TOP_FILES
            };
            for result in with_violations.iter().take(shown) {
                output.push_str(&self.format_file(result));
            }
            if with_violations.len() > shown {
                output.push_str(&format!(
                    "  ... and {} more (see report.html)\n",
                    with_violations.len() - shown
                ));
            }
        }

        if totals.failed() > 0 {
            let heading = format!("Files not audited ({}):", totals.failed());
            output.push_str(&format!("\n{}\n", heading.bold()));
            let failed = report
                .per_file
                .iter()
                .filter(|r| matches!(r.status, ScanStatus::Timeout | ScanStatus::Error));
            for result in failed {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    self.status_color(result.status),
                    result.relative_path(),
                    result.error.as_deref().unwrap_or("")
                ));
            }
        }

        output.push_str(&format!("{}\n", "━".repeat(50)));
        output.push_str(&format!(
            "Summary: {} critical, {} serious, {} moderate, {} minor\n",
            totals.by_severity.critical.to_string().red().bold(),
            totals.by_severity.serious.to_string().yellow().bold(),
            totals.by_severity.moderate.to_string().cyan(),
            totals.by_severity.minor
        ));
        output.push_str(&format!(
            "Rules: {} evaluated, {} with violations\n",
            report.rules.len(),
            report.rules.iter().filter(|r| r.violations > 0).count()
        ));

        output
    }
}
