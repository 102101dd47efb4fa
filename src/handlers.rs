//! Command handlers for the `a11y-audit` binary.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::{Config, RunConfig};
use crate::engine;
use crate::error::{Result, ScanError};
use crate::reporter::{ReportGenerator, Reporter, ScanProgress, TerminalReporter};
use crate::run::scan_with;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "A11Y_AUDIT_LOG";

/// Exit code for a run interrupted with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// Exit code for fatal errors.
pub const EXIT_FATAL: u8 = 2;

/// Install the stderr log subscriber.
pub fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve the effective configuration: config file first, then CLI flags.
pub fn load_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match cli.config {
        Some(ref path) => Config::from_file(path)?,
        None => {
            let cwd = std::env::current_dir().ok();
            Config::load(cwd.as_deref())
        }
    };
    cli.apply_to(&mut config);
    Ok(config.validate()?)
}

/// Run a scan and write reports.
pub fn run_normal_mode(cli: &Cli) -> ExitCode {
    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => return fatal(&e),
    };
    info!(
        root = %config.root().display(),
        engine = config.engine().kind.as_str(),
        pool_size = config.pool_size(),
        "Starting scan"
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return fatal(&ScanError::Runtime(e)),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    runtime.spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, &on_interrupt).await {
            eprintln!("{}", "Interrupted again, exiting without a report.".red());
            std::process::exit(i32::from(EXIT_CANCELLED));
        }
    });

    let is_ci = cli.ci || std::env::var_os("CI").is_some();
    let progress = Arc::new(ScanProgress::new(std::io::stderr().is_terminal(), is_ci));

    let result = runtime.block_on(async {
        let engine = engine::build(&config)?;
        scan_with(&config, engine, &cancel, progress).await
    });
    let report = match result {
        Ok(report) => report,
        Err(e) => return fatal(&e),
    };

    let written = match ReportGenerator::new(config.output_dir(), config.page_size()).write(&report)
    {
        Ok(written) => written,
        Err(e) => return fatal(&e),
    };

    if !cli.quiet {
        println!("{}", TerminalReporter::new(cli.verbose).report(&report));
        println!("Report written to {}", written.html.display());
        println!("Data written to {}", written.json.display());
    }

    debug!(
        files = report.totals.files,
        violations = report.totals.by_severity.total(),
        "Scan complete"
    );

    if cancel.is_cancelled() {
        eprintln!("{}", "Scan cancelled; report is partial.".yellow());
        return ExitCode::from(EXIT_CANCELLED);
    }
    ExitCode::SUCCESS
}

/// Cancel on the first interrupt and return `true` on the second, at which
/// point the caller abandons in-flight audits. Returns `false` if the signal
/// source fails.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: &CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupted, finishing in-flight audits (press Ctrl-C again to abort)");
    cancel.cancel();
    next_interrupt().await.is_ok()
}

fn fatal(err: &ScanError) -> ExitCode {
    eprintln!("{} {}", "Error:".red().bold(), err);
    ExitCode::from(EXIT_FATAL)
}
