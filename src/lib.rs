pub mod aggregator;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod reporter;
pub mod rules;
pub mod run;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use aggregator::{AggregateReport, RuleFrequency, Totals, aggregate};
pub use cli::Cli;
pub use config::{Config, ConfigError, EngineKind, RunConfig};
pub use discovery::{Discovery, DiscoveryError, ScanTarget, discover};
pub use engine::{
    AuditError, AuditTimeout, BrowserEngine, RenderingEngine, Session, SessionError, StaticEngine,
};
pub use error::{Result, ScanError};
pub use orchestrator::{NoopObserver, Orchestrator, ScanObserver};
pub use reporter::{
    HtmlReporter, JsonReporter, ReportGenerator, Reporter, ScanProgress, TerminalReporter,
};
pub use rules::{Impact, OutcomeKind, RuleOutcome};
pub use run::{scan, scan_with};
pub use types::{ScanResult, ScanStatus};
