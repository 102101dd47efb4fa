//! Progress bar for terminal output during scanning.
//!
//! Uses Braille pattern characters for a modern, high-density display.

use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};

use crate::orchestrator::ScanObserver;
use crate::types::{ScanResult, ScanStatus};

/// Minimum number of files to display progress bar
const MIN_FILES_FOR_PROGRESS: usize = 10;

/// Progress bar driven by orchestrator notifications.
///
/// The bar is created when the run starts and the target count is known.
pub struct ScanProgress {
    is_tty: bool,
    is_ci: bool,
    bar: OnceLock<Option<ProgressBar>>,
}

impl ScanProgress {
    pub fn new(is_tty: bool, is_ci: bool) -> Self {
        Self {
            is_tty,
            is_ci,
            bar: OnceLock::new(),
        }
    }

    fn bar(&self) -> Option<&ProgressBar> {
        self.bar.get().and_then(Option::as_ref)
    }
}

impl ScanObserver for ScanProgress {
    fn on_start(&self, total: usize) {
        self.bar.get_or_init(|| {
            should_show_progress(total, self.is_tty, self.is_ci).then(|| create_progress_bar(total))
        });
    }

    fn on_result(&self, result: &ScanResult) {
        if let Some(bar) = self.bar() {
            if result.status != ScanStatus::Success {
                bar.println(format!("{:>8} {}", result.status.as_str(), result.relative_path()));
            }
            bar.inc(1);
        }
    }

    fn on_finish(&self) {
        if let Some(bar) = self.bar() {
            bar.finish_and_clear();
        }
    }
}

/// Check if progress bar should be displayed.
fn should_show_progress(total_files: usize, is_tty: bool, is_ci: bool) -> bool {
    total_files >= MIN_FILES_FOR_PROGRESS && is_tty && !is_ci
}

/// Create a progress bar with Braille pattern style.
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "Auditing {bar:40} {pos:>4}/{len:4} files ({percent:>3}%) [{elapsed_precise} < {eta_precise}]",
        )
        .expect("Invalid progress bar template")
        .progress_chars("⣿⣀ "), // Braille pattern: filled, current, empty
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{sample_results, target};

    #[test]
    fn test_should_show_progress_thresholds() {
        assert!(!should_show_progress(9, true, false));
        assert!(should_show_progress(10, true, false));
        assert!(should_show_progress(100, true, false));
    }

    #[test]
    fn test_should_not_show_in_non_tty() {
        // Non-TTY environment (e.g., piped output)
        assert!(!should_show_progress(100, false, false));
    }

    #[test]
    fn test_should_not_show_in_ci() {
        assert!(!should_show_progress(100, true, true));
        assert!(!should_show_progress(100, false, true));
    }

    #[test]
    fn test_bar_created_on_start() {
        let progress = ScanProgress::new(true, false);
        assert!(progress.bar().is_none());

        progress.on_start(10);
        assert!(progress.bar().is_some());
    }

    #[test]
    fn test_no_bar_below_threshold() {
        let progress = ScanProgress::new(true, false);
        progress.on_start(9);
        assert!(progress.bar().is_none());
    }

    #[test]
    fn test_on_result_advances_bar() {
        let progress = ScanProgress::new(true, false);
        progress.on_start(20);
        for result in sample_results() {
            progress.on_result(&result);
        }
        assert_eq!(progress.bar().map(|b| b.position()), Some(6));
        progress.on_finish();
    }

    #[test]
    fn test_notifications_without_bar() {
        let progress = ScanProgress::new(false, false);
        progress.on_start(100);
        // Should not panic even without bar
        progress.on_result(&ScanResult::skipped(target("a.html")));
        progress.on_finish();
    }

    #[test]
    fn test_create_progress_bar() {
        let pb = create_progress_bar(100);
        assert_eq!(pb.length(), Some(100));
    }
}
