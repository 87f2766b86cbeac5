//! # Session Replay
//!
//! Runs a recorded session through an in-process sandbox. A session is
//! JSON lines; each line is one of
//!
//! ```text
//! {"type": "urlchange", "url": "https://x.csb.app/"}   frame from the sandbox
//! {"action": "go", "direction": "back"}                user action
//! {"wait_ms": 500}                                     let time pass
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::core::action::Action;
use crate::core::config::ResolvedConfig;
use crate::core::state::PanelSnapshot;
use crate::runtime::connect;
use crate::sandbox::{ChannelSandbox, OutboundCommand, PreviewTree};

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayStep {
    Frame(Value),
    Action(Action),
    Wait(Duration),
}

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "replay I/O error: {e}"),
            ReplayError::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// What the panel looked like after the session, and what it sent.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub snapshot: PanelSnapshot,
    pub dispatched: Vec<OutboundCommand>,
    pub previews: Vec<PreviewTree>,
}

/// Reads a session from a file, or from stdin when `path` is `-`.
pub fn read_session(path: &Path) -> Result<String, ReplayError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(ReplayError::Io)?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(ReplayError::Io)
}

pub fn parse_session(text: &str) -> Result<Vec<ReplayStep>, ReplayError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parse_err = |message: String| ReplayError::Parse { line, message };

        let value: Value = serde_json::from_str(trimmed).map_err(|e| parse_err(e.to_string()))?;
        let step = if value.get("type").is_some() {
            ReplayStep::Frame(value)
        } else if value.get("action").is_some() {
            let action = serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;
            ReplayStep::Action(action)
        } else if let Some(wait) = value.get("wait_ms") {
            let ms = wait
                .as_u64()
                .ok_or_else(|| parse_err("wait_ms must be a non-negative integer".into()))?;
            ReplayStep::Wait(Duration::from_millis(ms))
        } else {
            return Err(parse_err(
                "expected a frame (\"type\"), an \"action\", or \"wait_ms\"".into(),
            ));
        };
        steps.push(step);
    }
    Ok(steps)
}

pub async fn replay(steps: Vec<ReplayStep>, config: &ResolvedConfig) -> ReplayReport {
    let sandbox = ChannelSandbox::new();
    let mut conn = connect(Arc::new(sandbox.clone()), config);
    info!("Replaying {} steps", steps.len());

    for step in steps {
        match step {
            ReplayStep::Frame(frame) => {
                if let Err(e) = sandbox.emit(frame) {
                    debug!("Frame not delivered: {e}");
                }
                conn.drain_pending();
            }
            ReplayStep::Action(action) => conn.perform(action),
            ReplayStep::Wait(duration) => {
                // The frame stream never ends while the sandbox is alive, so
                // the timeout is the normal way out.
                let _ = tokio::time::timeout(duration, conn.run()).await;
            }
        }
    }

    let report = ReplayReport {
        snapshot: conn.snapshot(),
        dispatched: sandbox.dispatched(),
        previews: sandbox.previews(),
    };
    conn.disconnect();
    report
}
