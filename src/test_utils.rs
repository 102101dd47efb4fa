#[cfg(test)]
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use crate::discovery::ScanTarget;
    use crate::engine::AuditOutcome;
    use crate::rules::{AffectedNode, Impact, OutcomeKind, RuleOutcome};
    use crate::types::ScanResult;

    pub fn target(relative: &str) -> ScanTarget {
        ScanTarget::new(Path::new("/repo"), PathBuf::from("/repo").join(relative), 128)
    }

    pub fn violation(id: &str, impact: Impact) -> RuleOutcome {
        RuleOutcome {
            impact: Some(impact),
            nodes: vec![AffectedNode {
                target: vec!["body".to_string()],
                html: Some("<body>".to_string()),
                failure_summary: Some("Fix any of the following".to_string()),
            }],
            ..outcome(id, OutcomeKind::Violation)
        }
    }

    pub fn outcome(id: &str, kind: OutcomeKind) -> RuleOutcome {
        RuleOutcome {
            id: id.to_string(),
            kind,
            description: format!("{id} description"),
            help: format!("{id} help"),
            help_url: Some(format!("https://dequeuniversity.com/rules/axe/4.7/{id}")),
            impact: None,
            nodes: Vec::new(),
        }
    }

    /// A successful result with the given violations and passes.
    pub fn success(relative: &str, violations: &[(&str, Impact)], passes: &[&str]) -> ScanResult {
        ScanResult::success(
            target(relative),
            AuditOutcome {
                violations: violations
                    .iter()
                    .map(|(id, impact)| violation(id, *impact))
                    .collect(),
                passes: passes.iter().map(|id| outcome(id, OutcomeKind::Pass)).collect(),
                ..AuditOutcome::default()
            },
            Duration::from_millis(40),
            1,
        )
    }

    /// A mixed result set covering every status.
    pub fn sample_results() -> Vec<ScanResult> {
        vec![
            success(
                "src/app/home.html",
                &[("image-alt", Impact::Critical), ("label", Impact::Serious)],
                &["document-title"],
            ),
            success("src/app/about.html", &[("label", Impact::Serious)], &["image-alt"]),
            success("index.html", &[], &["image-alt", "label", "document-title"]),
            ScanResult::timeout(target("slow.html"), Duration::from_secs(120), 1),
            ScanResult::error(target("broken.html"), "Session crashed: driver exited", Duration::from_millis(900), 2),
            ScanResult::skipped(target("zzz.html")),
        ]
    }
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;

    use crate::discovery::ScanTarget;
    use crate::engine::{AuditError, RenderingEngine, Session, SessionError};
    use crate::rules::Impact;

    /// How a mock session answers an audit of one file.
    #[derive(Debug, Clone)]
    pub enum Behavior {
        Clean,
        Violations(Vec<(&'static str, Impact)>),
        /// Never answers.
        Hang,
        /// The first `n` audits of this file crash the session.
        Fail(usize),
        Malformed,
    }

    #[derive(Default)]
    struct State {
        behaviors: HashMap<String, Behavior>,
        failing_opens: AtomicUsize,
        opened: AtomicUsize,
        live: AtomicUsize,
        terminated: AtomicUsize,
        active: AtomicUsize,
        peak_active: AtomicUsize,
        audits: AtomicUsize,
        failures: Mutex<HashMap<String, usize>>,
        cancel_after: Option<(usize, CancellationToken)>,
        delay: Duration,
    }

    /// Scriptable engine that records how its sessions are used.
    #[derive(Clone, Default)]
    pub struct MockEngine {
        state: Arc<State>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        fn state_mut(&mut self) -> &mut State {
            Arc::get_mut(&mut self.state).expect("configure MockEngine before sharing it")
        }

        pub fn behavior(mut self, relative: &str, behavior: Behavior) -> Self {
            self.state_mut()
                .behaviors
                .insert(relative.to_string(), behavior);
            self
        }

        /// Fail the first `n` session opens.
        pub fn failing_opens(mut self, n: usize) -> Self {
            self.state_mut().failing_opens = AtomicUsize::new(n);
            self
        }

        /// Cancel `token` when the `n`th audit starts.
        pub fn cancel_after(mut self, n: usize, token: CancellationToken) -> Self {
            self.state_mut().cancel_after = Some((n, token));
            self
        }

        /// Sleep this long inside every audit.
        pub fn delay(mut self, delay: Duration) -> Self {
            self.state_mut().delay = delay;
            self
        }

        pub fn opened(&self) -> usize {
            self.state.opened.load(Ordering::SeqCst)
        }

        pub fn live_sessions(&self) -> usize {
            self.state.live.load(Ordering::SeqCst)
        }

        pub fn terminated(&self) -> usize {
            self.state.terminated.load(Ordering::SeqCst)
        }

        /// Highest number of audits running at once.
        pub fn peak_active(&self) -> usize {
            self.state.peak_active.load(Ordering::SeqCst)
        }

        pub fn audits(&self) -> usize {
            self.state.audits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RenderingEngine for MockEngine {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn open_session(&self) -> Result<Box<dyn Session>, SessionError> {
            let failing = self
                .state
                .failing_opens
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if failing.is_ok() {
                return Err(SessionError::Startup("mock browser refused to start".to_string()));
            }

            self.state.opened.fetch_add(1, Ordering::SeqCst);
            self.state.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockSession {
                state: Arc::clone(&self.state),
                loaded: None,
                alive: true,
            }))
        }
    }

    struct MockSession {
        state: Arc<State>,
        loaded: Option<String>,
        alive: bool,
    }

    impl MockSession {
        fn shut(&mut self) {
            if self.alive {
                self.alive = false;
                self.state.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    impl Drop for MockSession {
        fn drop(&mut self) {
            self.shut();
        }
    }

    struct ActiveGuard(Arc<State>);

    impl ActiveGuard {
        fn enter(state: &Arc<State>) -> Self {
            let active = state.active.fetch_add(1, Ordering::SeqCst) + 1;
            state.peak_active.fetch_max(active, Ordering::SeqCst);
            Self(Arc::clone(state))
        }
    }

    impl Drop for ActiveGuard {
        fn drop(&mut self) {
            self.0.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Session for MockSession {
        async fn load(&mut self, target: &ScanTarget) -> Result<(), AuditError> {
            self.loaded = Some(target.relative_path.clone());
            Ok(())
        }

        async fn audit(&mut self) -> Result<Value, AuditError> {
            let _active = ActiveGuard::enter(&self.state);
            let count = self.state.audits.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((n, token)) = &self.state.cancel_after
                && count == *n
            {
                token.cancel();
            }
            if !self.state.delay.is_zero() {
                tokio::time::sleep(self.state.delay).await;
            }

            let path = self.loaded.clone().unwrap_or_default();
            let behavior = self
                .state
                .behaviors
                .get(&path)
                .cloned()
                .unwrap_or(Behavior::Clean);

            match behavior {
                Behavior::Clean => Ok(response(&[])),
                Behavior::Violations(violations) => Ok(response(&violations)),
                Behavior::Hang => std::future::pending().await,
                Behavior::Malformed => Ok(json!({"violations": "oops"})),
                Behavior::Fail(n) => {
                    let mut failures = self.state.failures.lock().unwrap();
                    let seen = failures.entry(path).or_default();
                    *seen += 1;
                    if *seen <= n {
                        Err(AuditError::SessionCrashed("mock page crashed".to_string()))
                    } else {
                        Ok(response(&[]))
                    }
                }
            }
        }

        async fn close(&mut self) {
            self.shut();
        }

        fn terminate(&mut self) {
            if self.alive {
                self.state.terminated.fetch_add(1, Ordering::SeqCst);
            }
            self.shut();
        }
    }

    fn response(violations: &[(&str, Impact)]) -> Value {
        let violations: Vec<Value> = violations
            .iter()
            .map(|(id, impact)| {
                json!({
                    "id": id,
                    "impact": impact.as_str(),
                    "description": format!("{id} description"),
                    "help": format!("{id} help"),
                    "nodes": [{"target": ["body"]}],
                })
            })
            .collect();
        json!({
            "violations": violations,
            "passes": [{"id": "document-title", "impact": null, "nodes": []}],
            "inapplicable": [],
            "incomplete": [],
        })
    }
}
