//! Orchestrator stage: audit every target through a bounded session pool.
//!
//! `pool_size` workers pull targets from a shared queue. Each worker acquires
//! a session, loads the target, runs the evaluator under the per-file budget
//! and turns the outcome into exactly one [`ScanResult`]. Completion order is
//! not meaningful; the aggregator sorts results.

pub mod pool;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{RetryConfig, RunConfig};
use crate::discovery::ScanTarget;
use crate::engine::{AuditError, AuditOutcome, AuditTimeout, RenderingEngine, SessionError, parse_audit_response};
use crate::types::ScanResult;

pub use pool::{PooledSession, SessionPool};

/// Receives progress notifications while a run is in flight.
pub trait ScanObserver: Send + Sync {
    fn on_start(&self, _total: usize) {}

    fn on_result(&self, result: &ScanResult);

    fn on_finish(&self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_result(&self, _result: &ScanResult) {}
}

/// Audits targets with at most `pool_size` sessions at a time.
pub struct Orchestrator {
    engine: Arc<dyn RenderingEngine>,
    pool_size: usize,
    timeout: Duration,
    audit_retries: u32,
    session_retry: RetryConfig,
}

struct Shared {
    pool: Arc<SessionPool>,
    queue: Mutex<VecDeque<ScanTarget>>,
    results: Mutex<Vec<ScanResult>>,
    cancel: CancellationToken,
    observer: Arc<dyn ScanObserver>,
    timeout: Duration,
    audit_retries: u32,
}

impl Orchestrator {
    pub fn new(config: &RunConfig, engine: Arc<dyn RenderingEngine>) -> Self {
        Self {
            engine,
            pool_size: config.pool_size(),
            timeout: config.timeout(),
            audit_retries: config.audit_retries(),
            session_retry: config.session_retry().clone(),
        }
    }

    /// Override the per-file budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Audit every target once.
    ///
    /// Returns one result per target. Targets left unscanned because
    /// `cancel` fired are reported as skipped. Fails only when no session
    /// can be opened at all.
    pub async fn run(
        &self,
        targets: Vec<ScanTarget>,
        cancel: &CancellationToken,
        observer: Arc<dyn ScanObserver>,
    ) -> Result<Vec<ScanResult>, SessionError> {
        let total = targets.len();
        observer.on_start(total);
        info!(
            targets = total,
            pool_size = self.pool_size,
            engine = self.engine.name(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Starting scan"
        );

        let pool = SessionPool::new(
            Arc::clone(&self.engine),
            self.pool_size,
            self.session_retry.clone(),
        );
        let shared = Arc::new(Shared {
            pool: Arc::clone(&pool),
            queue: Mutex::new(targets.into()),
            results: Mutex::new(Vec::with_capacity(total)),
            cancel: cancel.clone(),
            observer: Arc::clone(&observer),
            timeout: self.timeout,
            audit_retries: self.audit_retries,
        });

        let mut workers = JoinSet::new();
        for id in 0..self.pool_size.min(total.max(1)) {
            let shared = Arc::clone(&shared);
            workers.spawn(async move { worker(id, shared).await });
        }

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failure.get_or_insert(err);
                }
                Err(err) => {
                    warn!(error = %err, "Scan worker panicked");
                    failure.get_or_insert(SessionError::PoolClosed);
                }
            }
        }

        pool.shutdown().await;
        observer.on_finish();

        if let Some(err) = failure {
            return Err(err);
        }

        let remaining: Vec<ScanTarget> = lock(&shared.queue).drain(..).collect();
        let mut results = std::mem::take(&mut *lock(&shared.results));
        if !remaining.is_empty() {
            info!(skipped = remaining.len(), "Scan cancelled");
        }
        for target in remaining {
            let result = ScanResult::skipped(target);
            observer.on_result(&result);
            results.push(result);
        }

        info!(
            results = results.len(),
            sessions_opened = pool.opened(),
            peak_sessions = pool.peak_in_use(),
            "Scan finished"
        );
        Ok(results)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn worker(id: usize, shared: Arc<Shared>) -> Result<(), SessionError> {
    loop {
        if shared.cancel.is_cancelled() {
            debug!(worker = id, "Cancelled, stopping");
            return Ok(());
        }
        let Some(target) = lock(&shared.queue).pop_front() else {
            return Ok(());
        };

        let session = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                lock(&shared.queue).push_front(target);
                return Ok(());
            }
            acquired = shared.pool.acquire() => acquired?,
        };

        let result = scan_target(&shared, session, target).await?;
        shared.observer.on_result(&result);
        lock(&shared.results).push(result);
    }
}

async fn scan_target(
    shared: &Shared,
    mut session: PooledSession,
    target: ScanTarget,
) -> Result<ScanResult, SessionError> {
    let started = Instant::now();
    let attempts = shared.audit_retries + 1;
    let mut attempt = 1;

    loop {
        match audit_within(&mut session, &target, shared.timeout).await {
            Ok(outcome) => {
                session.release();
                debug!(
                    path = %target.relative_path,
                    violations = outcome.violations.len(),
                    "Audit succeeded"
                );
                return Ok(ScanResult::success(target, outcome, started.elapsed(), attempt));
            }
            Err(Failure::Timeout(timeout)) => {
                session.discard();
                warn!(path = %target.relative_path, error = %timeout, "Audit timed out");
                return Ok(ScanResult::timeout(target, timeout.budget, attempt));
            }
            Err(Failure::Audit(err)) => {
                session.discard();
                if attempt >= attempts {
                    warn!(path = %target.relative_path, attempt, error = %err, "Audit failed");
                    return Ok(ScanResult::error(target, err.to_string(), started.elapsed(), attempt));
                }
                warn!(path = %target.relative_path, attempt, error = %err, "Audit failed, retrying with a fresh session");
                attempt += 1;
                session = shared.pool.acquire().await?;
            }
        }
    }
}

enum Failure {
    Timeout(AuditTimeout),
    Audit(AuditError),
}

/// Load and audit `target`, bounded by `budget`.
async fn audit_within(
    session: &mut PooledSession,
    target: &ScanTarget,
    budget: Duration,
) -> Result<AuditOutcome, Failure> {
    let attempt = async {
        session.load(target).await?;
        let raw = session.audit().await?;
        parse_audit_response(&raw)
    };
    match tokio::time::timeout(budget, attempt).await {
        Ok(outcome) => outcome.map_err(Failure::Audit),
        Err(_) => Err(Failure::Timeout(AuditTimeout { budget })),
    }
}
