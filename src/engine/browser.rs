//! Headless browser engine.
//!
//! Each session is a Node.js driver process that launches Chromium through
//! puppeteer and evaluates pages with axe-core. The driver speaks one JSON
//! object per line on stdin/stdout:
//!
//! ```text
//! <- {"ready": true}                      once the browser is up
//! -> {"cmd": "load", "path": "/abs/file.html"}
//! <- {"ok": true}
//! -> {"cmd": "audit"}
//! <- {"ok": true, "result": { ...axe results... }}
//! -> {"cmd": "close"}
//! <- {"ok": true}
//! ```
//!
//! Failures are reported as `{"ok": false, "error": "..."}` (or
//! `{"ready": false, "error": "..."}` during startup).
//!
//! Chromium is attached to the driver over a pipe rather than a WebSocket, so
//! killing the driver also takes the browser down.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempPath;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

use crate::config::RunConfig;
use crate::discovery::ScanTarget;

use super::error::{AuditError, SessionError};
use super::traits::{RenderingEngine, Session};

const DRIVER_SCRIPT: &str = r#"'use strict';
const readline = require('readline');
const { pathToFileURL } = require('url');

function emit(message) {
  process.stdout.write(JSON.stringify(message) + '\n');
}

function describe(err) {
  return String((err && err.message) || err);
}

let puppeteer;
let axeSource;
try {
  puppeteer = require('puppeteer');
  axeSource = require('axe-core').source;
} catch (err) {
  emit({ ready: false, error: `missing dependency: ${describe(err)}` });
  process.exit(1);
}

(async () => {
  const browser = await puppeteer.launch({
    headless: true,
    pipe: true,
    args: ['--no-sandbox', '--disable-setuid-sandbox', '--allow-file-access-from-files'],
  });
  const page = await browser.newPage();
  emit({ ready: true });

  const input = readline.createInterface({ input: process.stdin });
  for await (const line of input) {
    let request;
    try {
      request = JSON.parse(line);
    } catch (err) {
      emit({ ok: false, error: `invalid request: ${describe(err)}` });
      continue;
    }
    try {
      if (request.cmd === 'load') {
        await page.goto(pathToFileURL(request.path).href, { waitUntil: 'networkidle0', timeout: 0 });
        emit({ ok: true });
      } else if (request.cmd === 'audit') {
        await page.evaluate(axeSource);
        const result = await page.evaluate(async () => await axe.run(document));
        emit({ ok: true, result });
      } else if (request.cmd === 'close') {
        emit({ ok: true });
        break;
      } else {
        emit({ ok: false, error: `unknown command: ${request.cmd}` });
      }
    } catch (err) {
      emit({ ok: false, error: describe(err) });
    }
  }

  await browser.close();
  process.exit(0);
})().catch((err) => {
  emit({ ready: false, error: describe(err) });
  process.exit(1);
});
"#;

const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Spawns one Node.js driver per session.
#[derive(Debug, Clone)]
pub struct BrowserEngine {
    node_binary: String,
    node_path: PathBuf,
    startup_timeout: Duration,
    script: Arc<TempPath>,
}

impl BrowserEngine {
    /// Write the driver script to a temporary file and capture the engine
    /// settings from `config`.
    pub fn new(config: &RunConfig) -> Result<Self, SessionError> {
        let mut file = tempfile::Builder::new()
            .prefix("a11y-audit-driver-")
            .suffix(".js")
            .tempfile()
            .map_err(SessionError::Setup)?;
        std::io::Write::write_all(&mut file, DRIVER_SCRIPT.as_bytes()).map_err(SessionError::Setup)?;

        let engine = config.engine();
        Ok(Self {
            node_binary: engine.node_binary.clone(),
            node_path: config.node_path(),
            startup_timeout: Duration::from_secs(engine.startup_timeout_secs),
            script: Arc::new(file.into_temp_path()),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.node_binary);
        cmd.arg(self.script.as_os_str())
            .env("NODE_PATH", &self.node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl RenderingEngine for BrowserEngine {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn open_session(&self) -> Result<Box<dyn Session>, SessionError> {
        let mut child = self.command().spawn().map_err(|source| SessionError::Launch {
            program: self.node_binary.clone(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(SessionError::Startup("driver stdio not captured".to_string()));
        };

        if let Some(stderr) = child.stderr.take() {
            let pid = child.id();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(pid, line = %line, "driver stderr");
                }
            });
        }

        let mut session = BrowserSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let ready = tokio::time::timeout(self.startup_timeout, session.read_message())
            .await
            .map_err(|_| SessionError::StartupTimeout(self.startup_timeout))?
            .map_err(|e| SessionError::Startup(e.to_string()))?;

        if ready.get("ready").and_then(Value::as_bool) != Some(true) {
            let message = ready
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("driver did not report ready")
                .to_string();
            session.terminate();
            return Err(SessionError::Startup(message));
        }

        debug!(pid = session.child.id(), "Browser session ready");
        Ok(Box::new(session))
    }
}

struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl BrowserSession {
    async fn read_message(&mut self) -> Result<Value, AuditError> {
        let line = self
            .stdout
            .next_line()
            .await
            .map_err(|e| AuditError::SessionCrashed(e.to_string()))?
            .ok_or_else(|| AuditError::SessionCrashed("driver exited".to_string()))?;
        trace!(bytes = line.len(), "driver message");
        serde_json::from_str(&line)
            .map_err(|e| AuditError::Malformed(format!("driver output is not JSON: {e}")))
    }

    /// Send one command and wait for its reply. `Err(message)` carries a
    /// failure reported by the driver itself.
    async fn request(&mut self, command: Value) -> Result<Result<Value, String>, AuditError> {
        let mut line = command.to_string();
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AuditError::SessionCrashed(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AuditError::SessionCrashed(e.to_string()))?;

        let mut reply = self.read_message().await?;
        if reply.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(Ok(reply.get_mut("result").map(Value::take).unwrap_or(Value::Null)))
        } else {
            let message = reply
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown driver error")
                .to_string();
            Ok(Err(message))
        }
    }
}

#[async_trait]
impl Session for BrowserSession {
    async fn load(&mut self, target: &ScanTarget) -> Result<(), AuditError> {
        let path = target.path.to_string_lossy();
        self.request(json!({"cmd": "load", "path": path}))
            .await?
            .map(|_| ())
            .map_err(|message| AuditError::Navigation {
                path: target.relative_path.clone(),
                message,
            })
    }

    async fn audit(&mut self) -> Result<Value, AuditError> {
        self.request(json!({"cmd": "audit"}))
            .await?
            .map_err(AuditError::Evaluator)
    }

    async fn close(&mut self) {
        let graceful = async {
            let _ = self.request(json!({"cmd": "close"})).await;
            self.child.wait().await
        };
        match tokio::time::timeout(CLOSE_GRACE, graceful).await {
            Ok(Ok(status)) => debug!(%status, "Browser session closed"),
            Ok(Err(e)) => warn!(error = %e, "Browser session did not exit cleanly"),
            Err(_) => {
                warn!("Browser session ignored close request, killing");
                self.terminate();
            }
        }
    }

    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            trace!(error = %e, "Browser session already gone");
        }
    }
}
