use a11y_audit::{
    Cli,
    handlers::{init_tracing, run_normal_mode},
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);
    run_normal_mode(&cli)
}
