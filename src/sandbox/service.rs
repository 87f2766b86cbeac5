use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

use super::types::{OutboundCommand, PreviewTree};

/// Errors surfaced by a sandbox service.
#[derive(Debug)]
pub enum SandboxError {
    /// The sandbox is not running or refused the request.
    Unavailable(String),
    /// The sandbox doesn't implement this request.
    Unsupported(&'static str),
    /// The channel to the sandbox was closed.
    ChannelClosed,
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxError::Unavailable(msg) => write!(f, "sandbox unavailable: {msg}"),
            SandboxError::Unsupported(what) => write!(f, "sandbox does not support {what}"),
            SandboxError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for SandboxError {}

/// The one inbound subscription a panel holds on a sandbox.
///
/// Yields raw frames in arrival order. Releasing it runs the service's
/// unsubscribe action exactly once, either through `unsubscribe()` or on drop.
pub struct Subscription {
    frames: UnboundedReceiver<Value>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(frames: UnboundedReceiver<Value>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            frames,
            release: Some(Box::new(release)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Returns the next frame that is already queued, without waiting.
    pub fn try_next_frame(&mut self) -> Option<Value> {
        if !self.is_active() {
            return None;
        }
        self.frames.try_recv().ok()
    }

    /// Stops delivery and runs the release action. Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            self.frames.close();
            release();
        }
    }
}

impl Stream for Subscription {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Value>> {
        if !self.is_active() {
            return Poll::Ready(None);
        }
        self.frames.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// The sandbox execution manager, seen from the panel.
///
/// Commands are fire-and-forget: the sandbox answers, if at all, with later
/// frames on the subscription.
#[async_trait]
pub trait SandboxService: Send + Sync {
    /// Returns the name of the sandbox backend.
    fn name(&self) -> &str;

    /// Opens the inbound frame subscription.
    fn subscribe(&self) -> Subscription;

    /// Sends a command to the sandbox.
    fn dispatch(&self, command: OutboundCommand);

    /// Pushes a new file/dependency tree for the sandbox to render.
    fn update_preview(&self, tree: &PreviewTree);

    /// Resolves the external editor URL for the current preview.
    async fn editor_url(&self) -> Result<String, SandboxError>;
}
