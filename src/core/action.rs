//! # Actions
//!
//! Everything that can happen to the panel becomes an `Action`.
//! The sandbox sends a frame? That's `Action::Inbound(event)`.
//! User clicks back? That's `Action::Go(Direction::Back)`.
//!
//! The `update()` function applies an action to the panel and returns the
//! `Effect` the runtime must perform. No I/O here and no clock reads: the
//! runtime passes the current time in and talks to the sandbox.
//!
//! ```text
//! Panel + Action + now  →  update()  →  Panel' + Effect
//! ```

use log::debug;
use serde::Deserialize;
use tokio::time::Instant;

use crate::core::commands;
use crate::core::navigation::Direction;
use crate::core::router;
use crate::core::state::Panel;
use crate::sandbox::{InboundEvent, OutboundCommand, PreviewTree};

/// User actions are deserializable so recorded sessions can replay them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// A frame from the sandbox. Not part of recorded user actions.
    #[serde(skip)]
    Inbound(InboundEvent),
    Go { direction: Direction },
    Refresh,
    SubmitCommand { text: String },
    SubmitInput,
    Type { text: String },
    Backspace,
    ClearConsole,
    ToggleConsole,
    UpdatePreview { tree: PreviewTree },
    /// Timer tick: roll back back/forward requests the sandbox never confirmed.
    ExpirePending,
}

/// Side effect requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Dispatch(OutboundCommand),
    UpdatePreview(PreviewTree),
}

pub fn update(panel: &mut Panel, action: Action, now: Instant) -> Effect {
    match action {
        Action::Inbound(event) => {
            let tag = event.tag();
            let routed = router::route(panel, event);
            debug!("Routed {tag}: {routed:?}");
            Effect::None
        }
        Action::Go { direction } => commands::request_go(panel, direction, now),
        Action::Refresh => commands::request_refresh(panel),
        Action::SubmitCommand { text } => commands::submit_command(panel, &text),
        Action::SubmitInput => commands::submit_input(panel),
        Action::Type { text } => {
            commands::insert_input(panel, &text);
            Effect::None
        }
        Action::Backspace => {
            commands::backspace_input(panel);
            Effect::None
        }
        Action::ClearConsole => commands::request_clear(panel),
        Action::ToggleConsole => commands::request_toggle_console_panel(panel),
        Action::UpdatePreview { tree } => commands::update_preview(panel, tree),
        Action::ExpirePending => {
            if panel
                .navigation
                .expire_pending(now, panel.ack_timeout)
            {
                debug!(
                    "Navigation unconfirmed after {:?}, cursor back at {}",
                    panel.ack_timeout,
                    panel.navigation.current_index()
                );
            }
            Effect::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_store::LogLevel;
    use crate::test_support::test_panel;
    use serde_json::json;

    fn url(u: &str) -> Action {
        Action::Inbound(InboundEvent::UrlChange { url: u.to_string() })
    }

    #[test]
    fn test_back_then_new_page_branches_history() {
        let mut panel = test_panel();
        update(&mut panel, url("A"), Instant::now());
        update(&mut panel, url("B"), Instant::now());
        update(&mut panel, url("C"), Instant::now());
        let effect = update(
            &mut panel,
            Action::Go {
                direction: Direction::Back,
            },
            Instant::now(),
        );
        assert_eq!(effect, Effect::Dispatch(OutboundCommand::UrlBack));
        update(&mut panel, url("D"), Instant::now());

        assert_eq!(panel.navigation.locations(), ["A", "B", "D"]);
        assert_eq!(panel.navigation.current_index(), 2);
    }

    #[test]
    fn test_submit_command_scenario() {
        let mut panel = test_panel();
        let effect = update(
            &mut panel,
            Action::SubmitCommand {
                text: "1+1".into(),
            },
            Instant::now(),
        );
        assert_eq!(
            effect,
            Effect::Dispatch(OutboundCommand::Evaluate {
                command: "1+1".into()
            })
        );
        assert_eq!(panel.logs.len(), 1);
        assert_eq!(panel.logs.last().unwrap().method, LogLevel::Command);
    }

    #[test]
    fn test_inbound_never_produces_effects() {
        let mut panel = test_panel();
        let frames = [
            url("A"),
            Action::Inbound(InboundEvent::EvalResult {
                result: json!(1),
                error: false,
            }),
            Action::Inbound(InboundEvent::Console {
                log: json!({"method": "log", "data": []}),
            }),
            Action::Inbound(InboundEvent::Unknown),
        ];
        for frame in frames {
            assert_eq!(update(&mut panel, frame, Instant::now()), Effect::None);
        }
    }

    #[test]
    fn test_user_actions_deserialize() {
        let go: Action = serde_json::from_value(json!({"action": "go", "direction": "back"})).unwrap();
        assert_eq!(
            go,
            Action::Go {
                direction: Direction::Back
            }
        );
        let submit: Action =
            serde_json::from_value(json!({"action": "submit-command", "text": "x"})).unwrap();
        assert_eq!(submit, Action::SubmitCommand { text: "x".into() });
        let toggle: Action = serde_json::from_value(json!({"action": "toggle-console"})).unwrap();
        assert_eq!(toggle, Action::ToggleConsole);
        assert!(serde_json::from_value::<Action>(json!({"action": "inbound"})).is_err());
    }

    #[test]
    fn test_expire_pending_rolls_back_after_timeout() {
        let mut panel = test_panel();
        let timeout = panel.ack_timeout;
        let t0 = Instant::now();
        update(&mut panel, url("A"), t0);
        update(&mut panel, url("B"), t0);
        update(
            &mut panel,
            Action::Go {
                direction: Direction::Back,
            },
            t0,
        );
        assert_eq!(panel.navigation.current_index(), 0);

        update(&mut panel, Action::ExpirePending, t0);
        assert_eq!(panel.navigation.current_index(), 0);

        update(&mut panel, Action::ExpirePending, t0 + timeout);
        assert_eq!(panel.navigation.current_index(), 1);
    }

    #[test]
    fn test_late_urlchange_after_rollback_restores_cursor() {
        let mut panel = test_panel();
        let timeout = panel.ack_timeout;
        let t0 = Instant::now();
        for u in ["A", "B", "C"] {
            update(&mut panel, url(u), t0);
        }
        update(
            &mut panel,
            Action::Go {
                direction: Direction::Back,
            },
            t0,
        );
        update(&mut panel, Action::ExpirePending, t0 + timeout);
        assert_eq!(panel.navigation.current_index(), 2);

        update(&mut panel, url("B"), t0 + timeout);
        assert_eq!(panel.navigation.locations(), ["A", "B", "C"]);
        assert_eq!(panel.navigation.current_index(), 1);
    }
}
