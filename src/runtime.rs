//! # Runtime
//!
//! Wires a `Panel` to a sandbox. `connect()` opens the one inbound
//! subscription and returns a `Connection` that owns it; the subscription is
//! released exactly once, by `disconnect()` or when the connection is dropped.
//!
//! ```text
//! sandbox ──frames──▶ Connection ──Action::Inbound──▶ update() ──▶ Panel
//!    ▲                    │
//!    └──── dispatch ◀── Effect ◀── update() ◀── user actions
//! ```
//!
//! Frames are handled one at a time in arrival order. While a back/forward
//! request is unconfirmed the loop also wakes at its deadline to roll it back.

use std::sync::Arc;

use futures::StreamExt;
use log::{debug, info, warn};
use serde_json::Value;
use tokio::time::{Instant, sleep_until};

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{Panel, PanelSnapshot};
use crate::sandbox::{InboundEvent, PreviewTree, SandboxError, SandboxService, Subscription};

pub struct Connection {
    service: Arc<dyn SandboxService>,
    subscription: Subscription,
    panel: Panel,
}

/// Mounts a panel on the sandbox: subscribes and pushes the default preview.
pub fn connect(service: Arc<dyn SandboxService>, config: &ResolvedConfig) -> Connection {
    let subscription = service.subscribe();
    info!("Connected to {} sandbox", service.name());
    service.update_preview(&PreviewTree::default());
    Connection {
        service,
        subscription,
        panel: Panel::new(config),
    }
}

impl Connection {
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.panel.snapshot()
    }

    pub fn is_connected(&self) -> bool {
        self.subscription.is_active()
    }

    /// Applies an action and carries out its effect. Ignored once disconnected.
    pub fn perform(&mut self, action: Action) {
        if !self.is_connected() {
            warn!("Ignoring {action:?} on a disconnected panel");
            return;
        }
        let effect = update(&mut self.panel, action, Instant::now());
        self.execute(effect);
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Dispatch(command) => {
                debug!("Dispatching {command:?}");
                self.service.dispatch(command);
            }
            Effect::UpdatePreview(tree) => {
                debug!("Updating preview ({} files, entry {})", tree.files.len(), tree.entry);
                self.service.update_preview(&tree);
            }
        }
    }

    /// Validates a raw frame and routes it. Frames that don't decode are dropped.
    pub fn handle_frame(&mut self, frame: Value) {
        match InboundEvent::from_frame(frame) {
            Ok(event) => self.perform(Action::Inbound(event)),
            Err(e) => debug!("Ignoring frame: {e}"),
        }
    }

    /// Routes every frame already queued, without waiting. Returns how many.
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(frame) = self.subscription.try_next_frame() {
            self.handle_frame(frame);
            handled += 1;
        }
        handled
    }

    /// Waits for the next frame or navigation deadline and handles it.
    /// Returns false once the frame stream has ended.
    pub async fn step(&mut self) -> bool {
        let deadline = self
            .panel
            .navigation
            .pending_deadline(self.panel.ack_timeout);

        tokio::select! {
            frame = self.subscription.next() => match frame {
                Some(frame) => {
                    self.handle_frame(frame);
                    true
                }
                None => false,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                self.perform(Action::ExpirePending);
                true
            }
        }
    }

    /// Handles frames until the sandbox closes the stream or the panel is
    /// disconnected.
    pub async fn run(&mut self) {
        while self.step().await {}
        debug!("Frame stream ended");
    }

    /// Asks the sandbox for the external editor URL of the current preview.
    pub async fn open_in_editor(&self) -> Result<String, SandboxError> {
        let url = self.service.editor_url().await?;
        info!("Editor URL: {url}");
        Ok(url)
    }

    /// Releases the subscription. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.subscription.is_active() {
            self.subscription.unsubscribe();
            info!("Disconnected from {} sandbox", self.service.name());
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
