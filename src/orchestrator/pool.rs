//! Bounded pool of rendering sessions.
//!
//! Each slot is one semaphore permit. A permit holder either reuses an idle
//! session or opens a fresh one. Slots whose session cannot be opened after
//! the configured retries are retired; once every slot is gone the pool is
//! closed and further acquisitions fail with
//! [`SessionError::PoolExhausted`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::discovery::ScanTarget;
use crate::engine::{AuditError, RenderingEngine, Session, SessionError};

pub struct SessionPool {
    engine: Arc<dyn RenderingEngine>,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn Session>>>,
    slots: AtomicUsize,
    retry: RetryConfig,
    last_failure: Mutex<Option<String>>,
    in_use: AtomicUsize,
    peak_in_use: AtomicUsize,
    opened: AtomicUsize,
}

impl SessionPool {
    pub fn new(engine: Arc<dyn RenderingEngine>, size: usize, retry: RetryConfig) -> Arc<Self> {
        Arc::new(Self {
            engine,
            permits: Arc::new(Semaphore::new(size)),
            idle: Mutex::new(Vec::with_capacity(size)),
            slots: AtomicUsize::new(size),
            retry,
            last_failure: Mutex::new(None),
            in_use: AtomicUsize::new(0),
            peak_in_use: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
        })
    }

    /// Wait for a free slot and check out a session for it.
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledSession, SessionError> {
        loop {
            let permit = self
                .permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| self.closed_error())?;

            let idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop();
            let session = match idle {
                Some(session) => session,
                None => match self.open_with_retry().await {
                    Ok(session) => session,
                    Err(err) => {
                        self.retire(permit, &err);
                        continue;
                    }
                },
            };

            let in_use = self.in_use.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_use.fetch_max(in_use, Ordering::SeqCst);

            return Ok(PooledSession {
                pool: Arc::clone(self),
                session: Some(session),
                _permit: permit,
            });
        }
    }

    async fn open_with_retry(&self) -> Result<Box<dyn Session>, SessionError> {
        let backoff = Duration::from_millis(self.retry.backoff_ms);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.engine.open_session().await {
                Ok(session) => {
                    let opened = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(engine = self.engine.name(), opened, "Opened session");
                    return Ok(session);
                }
                Err(err) if attempt > self.retry.attempts => return Err(err),
                Err(err) => {
                    warn!(attempt, error = %err, "Failed to open session, retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    fn retire(&self, permit: OwnedSemaphorePermit, err: &SessionError) {
        permit.forget();
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());

        let remaining = self.slots.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        warn!(error = %err, remaining, "Retiring session slot");
        if remaining == 0 {
            self.permits.close();
        }
    }

    fn closed_error(&self) -> SessionError {
        let last = self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match last {
            Some(message) if self.slots.load(Ordering::SeqCst) == 0 => {
                SessionError::PoolExhausted(message)
            }
            _ => SessionError::PoolClosed,
        }
    }

    /// Close every idle session gracefully.
    pub async fn shutdown(&self) {
        let sessions = std::mem::take(&mut *self.idle.lock().unwrap_or_else(PoisonError::into_inner));
        for mut session in sessions {
            session.close().await;
        }
    }

    /// Live slots (not retired).
    pub fn slots(&self) -> usize {
        self.slots.load(Ordering::SeqCst)
    }

    /// Highest number of sessions checked out at the same time.
    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use.load(Ordering::SeqCst)
    }

    /// Sessions opened over the pool's lifetime.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// A checked-out session.
///
/// [`release`](Self::release) returns it to the pool and
/// [`discard`](Self::discard) terminates it. Dropping the guard without
/// either terminates the session. The slot is freed in every case.
pub struct PooledSession {
    pool: Arc<SessionPool>,
    session: Option<Box<dyn Session>>,
    _permit: OwnedSemaphorePermit,
}

impl PooledSession {
    pub async fn load(&mut self, target: &ScanTarget) -> Result<(), AuditError> {
        self.live()?.load(target).await
    }

    pub async fn audit(&mut self) -> Result<Value, AuditError> {
        self.live()?.audit().await
    }

    fn live(&mut self) -> Result<&mut Box<dyn Session>, AuditError> {
        self.session
            .as_mut()
            .ok_or_else(|| AuditError::SessionCrashed("session already released".to_string()))
    }

    /// Return the session to the idle list for reuse.
    pub fn release(mut self) {
        if let Some(session) = self.session.take() {
            self.pool
                .idle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(session);
        }
    }

    /// Terminate the session; the next acquisition of this slot opens a
    /// fresh one.
    pub fn discard(mut self) {
        if let Some(mut session) = self.session.take() {
            session.terminate();
        }
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.terminate();
        }
        self.pool.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
