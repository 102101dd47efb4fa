//! Pipeline entry points: discover, orchestrate, aggregate.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::aggregator::{AggregateReport, aggregate};
use crate::config::RunConfig;
use crate::discovery::discover;
use crate::engine::{self, RenderingEngine};
use crate::error::{Result, ScanError};
use crate::orchestrator::{NoopObserver, Orchestrator, ScanObserver};

/// Run a complete scan on a private runtime with the configured engine.
pub fn scan(config: &RunConfig) -> Result<AggregateReport> {
    let runtime = tokio::runtime::Runtime::new().map_err(ScanError::Runtime)?;
    let engine = engine::build(config)?;
    let cancel = CancellationToken::new();
    runtime.block_on(scan_with(config, engine, &cancel, Arc::new(NoopObserver)))
}

/// Async form of [`scan`].
///
/// When `cancel` fires, targets not yet started are reported as skipped and
/// the aggregate still covers every discovered target.
pub async fn scan_with(
    config: &RunConfig,
    engine: Arc<dyn RenderingEngine>,
    cancel: &CancellationToken,
    observer: Arc<dyn ScanObserver>,
) -> Result<AggregateReport> {
    let discovery = discover(config)?;
    let results = Orchestrator::new(config, engine)
        .run(discovery.targets, cancel, observer)
        .await?;

    Ok(aggregate(results, config.snapshot(), Utc::now()))
}
