//! # Command Interface
//!
//! User-facing operations on the panel. Each returns the `Effect` the
//! runtime has to carry out; local state is updated before returning.

use serde_json::Value;
use tokio::time::Instant;

use crate::core::action::Effect;
use crate::core::log_store::LogLevel;
use crate::core::navigation::Direction;
use crate::core::state::Panel;
use crate::sandbox::{OutboundCommand, PreviewTree};

/// Back/forward. Moves the cursor optimistically; the sandbox confirms or
/// corrects it with a later `urlchange`.
pub fn request_go(panel: &mut Panel, direction: Direction, now: Instant) -> Effect {
    match panel.navigation.request_go(direction, now) {
        Some(command) => Effect::Dispatch(command),
        None => Effect::None,
    }
}

/// Logs the command and sends it for evaluation. Blank input is ignored.
pub fn submit_command(panel: &mut Panel, text: &str) -> Effect {
    if text.trim().is_empty() {
        return Effect::None;
    }
    panel
        .logs
        .append(LogLevel::Command, vec![Value::String(text.to_string())]);
    panel.input.clear();
    Effect::Dispatch(OutboundCommand::Evaluate {
        command: text.to_string(),
    })
}

/// Submits whatever is in the input buffer.
pub fn submit_input(panel: &mut Panel) -> Effect {
    let text = std::mem::take(&mut panel.input);
    let effect = submit_command(panel, &text);
    if effect == Effect::None {
        // Keep blank input as typed.
        panel.input = text;
    }
    effect
}

pub fn insert_input(panel: &mut Panel, text: &str) {
    panel.input.push_str(text);
}

/// Removes the last character of the input buffer.
pub fn backspace_input(panel: &mut Panel) {
    panel.input.pop();
}

pub fn request_clear(panel: &mut Panel) -> Effect {
    panel.logs.clear();
    Effect::None
}

pub fn request_toggle_console_panel(panel: &mut Panel) -> Effect {
    panel.show_console = !panel.show_console;
    Effect::None
}

/// Reloads the preview. The resulting `urlchange`, if any, updates history.
pub fn request_refresh(_panel: &mut Panel) -> Effect {
    Effect::Dispatch(OutboundCommand::Refresh)
}

/// Starts a fresh preview: the console is cleared and the tree is forwarded
/// with the "open in CodeSandbox" overlay disabled.
pub fn update_preview(panel: &mut Panel, mut tree: PreviewTree) -> Effect {
    panel.logs.clear();
    tree.show_open_in_codesandbox = false;
    Effect::UpdatePreview(tree)
}
