//! # Channel Sandbox
//!
//! An in-process sandbox backed by tokio channels. Frames pushed through
//! `emit()` reach the current subscriber; everything the panel dispatches is
//! recorded so callers can inspect or forward it.
//!
//! Used by `sandpane replay` and by the tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};

use super::service::{SandboxError, SandboxService, Subscription};
use super::types::{InboundEvent, OutboundCommand, PreviewTree};

#[derive(Default)]
struct Shared {
    subscriber: Option<(u64, UnboundedSender<Value>)>,
    next_subscriber_id: u64,
    dispatched: Vec<OutboundCommand>,
    previews: Vec<PreviewTree>,
}

#[derive(Clone, Default)]
pub struct ChannelSandbox {
    shared: Arc<Mutex<Shared>>,
    editor_url: Option<String>,
}

impl ChannelSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `editor_url()` answer with the given URL.
    pub fn with_editor_url(mut self, url: impl Into<String>) -> Self {
        self.editor_url = Some(url.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers a raw frame to the current subscriber.
    pub fn emit(&self, frame: Value) -> Result<(), SandboxError> {
        let shared = self.lock();
        let Some((_, sender)) = shared.subscriber.as_ref() else {
            return Err(SandboxError::ChannelClosed);
        };
        sender.send(frame).map_err(|_| SandboxError::ChannelClosed)
    }

    /// Serializes and delivers a typed event.
    pub fn emit_event(&self, event: &InboundEvent) -> Result<(), SandboxError> {
        let frame = serde_json::to_value(event)
            .map_err(|e| SandboxError::Unavailable(format!("unserializable event: {e}")))?;
        self.emit(frame)
    }

    pub fn has_subscriber(&self) -> bool {
        self.lock().subscriber.is_some()
    }

    /// Commands dispatched so far, oldest first.
    pub fn dispatched(&self) -> Vec<OutboundCommand> {
        self.lock().dispatched.clone()
    }

    /// Drains the dispatched command record.
    pub fn take_dispatched(&self) -> Vec<OutboundCommand> {
        std::mem::take(&mut self.lock().dispatched)
    }

    /// Preview trees pushed so far, oldest first.
    pub fn previews(&self) -> Vec<PreviewTree> {
        self.lock().previews.clone()
    }
}

#[async_trait]
impl SandboxService for ChannelSandbox {
    fn name(&self) -> &str {
        "channel"
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut shared = self.lock();
            let id = shared.next_subscriber_id;
            shared.next_subscriber_id += 1;
            if shared.subscriber.replace((id, tx)).is_some() {
                debug!("Replacing previous subscriber; only one preview frame is supported");
            }
            id
        };

        let shared = Arc::downgrade(&self.shared);
        Subscription::new(rx, move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(guard.subscriber, Some((current, _)) if current == id) {
                guard.subscriber = None;
                debug!("Subscriber {id} released");
            }
        })
    }

    fn dispatch(&self, command: OutboundCommand) {
        trace!("dispatch {:?}", command);
        self.lock().dispatched.push(command);
    }

    fn update_preview(&self, tree: &PreviewTree) {
        trace!("update_preview with {} files", tree.files.len());
        self.lock().previews.push(tree.clone());
    }

    async fn editor_url(&self) -> Result<String, SandboxError> {
        self.editor_url
            .clone()
            .ok_or(SandboxError::Unsupported("editor url"))
    }
}
