//! # Event Router
//!
//! Applies one inbound sandbox event to the panel. Events are routed one at
//! a time, in arrival order; the router never talks to the sandbox.
//!
//! | tag           | effect on the panel                                |
//! |---------------|----------------------------------------------------|
//! | `urlchange`   | navigation stack records the URL                   |
//! | `eval-result` | `result` (or `error`) line with the decoded value  |
//! | `console`     | console line, or a clear, or dropped as noise      |
//! | anything else | ignored                                            |

use log::{debug, warn};

use crate::core::decode::{decode_console, decode_value};
use crate::core::log_store::LogLevel;
use crate::core::navigation::UrlChange;
use crate::core::state::Panel;
use crate::sandbox::InboundEvent;

/// What routing an event did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Navigation(UrlChange),
    Logged(LogLevel),
    ConsoleCleared,
    Suppressed,
    /// A console payload that could not be decoded.
    Dropped,
    Ignored,
}

pub fn route(panel: &mut Panel, event: InboundEvent) -> Routed {
    match event {
        InboundEvent::UrlChange { url } => {
            let change = panel.navigation.apply_url_change(&url);
            debug!("urlchange {url} -> {change:?}");
            Routed::Navigation(change)
        }
        InboundEvent::EvalResult { result, error } => {
            let level = if error {
                LogLevel::Error
            } else {
                LogLevel::Result
            };
            panel.logs.append(level.clone(), vec![decode_value(&result)]);
            Routed::Logged(level)
        }
        InboundEvent::Console { log } => match decode_console(&log) {
            Ok(message) if message.is_clear() => {
                panel.logs.clear();
                Routed::ConsoleCleared
            }
            Ok(message) if message.is_suppressed() => Routed::Suppressed,
            Ok(message) => {
                let level = LogLevel::from_method(&message.method);
                panel.logs.append(level.clone(), message.data);
                Routed::Logged(level)
            }
            Err(e) => {
                warn!("Dropping console message: {e}");
                Routed::Dropped
            }
        },
        InboundEvent::Unknown => Routed::Ignored,
    }
}
