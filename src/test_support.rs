//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::config::ResolvedConfig;
use crate::core::state::Panel;
use crate::sandbox::{OutboundCommand, PreviewTree, SandboxError, SandboxService, Subscription};

/// A sandbox that never emits anything and ignores every command.
#[derive(Default)]
pub struct NoopSandbox;

#[async_trait]
impl SandboxService for NoopSandbox {
    fn name(&self) -> &str {
        "noop"
    }

    fn subscribe(&self) -> Subscription {
        let (_tx, rx) = mpsc::unbounded_channel();
        Subscription::new(rx, || {})
    }

    fn dispatch(&self, _command: OutboundCommand) {}

    fn update_preview(&self, _tree: &PreviewTree) {}

    async fn editor_url(&self) -> Result<String, SandboxError> {
        Err(SandboxError::Unavailable("noop sandbox".to_string()))
    }
}

/// Defaults, independent of the environment.
pub fn test_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Creates a test Panel with default settings.
pub fn test_panel() -> Panel {
    Panel::new(&test_config())
}
