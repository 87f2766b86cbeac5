//! # Panel State
//!
//! Everything the preview panel knows, in one place.
//!
//! ```text
//! Panel
//! ├── navigation: NavigationStack   // back/forward history + cursor
//! ├── logs: LogStore                // mirrored console, oldest first
//! ├── show_console: bool            // console pane visibility
//! ├── input: String                 // console input buffer
//! ├── default_url: String           // shown while history is empty
//! └── ack_timeout: Duration         // rollback delay for back/forward
//! ```
//!
//! State changes only happen through `update(panel, action)` in action.rs.
//! Renderers read a `PanelSnapshot`.

use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::core::config::ResolvedConfig;
use crate::core::log_store::{LogEntry, LogStore};
use crate::core::navigation::NavigationStack;

pub struct Panel {
    pub navigation: NavigationStack,
    pub logs: LogStore,
    pub show_console: bool,
    pub input: String,
    pub default_url: String,
    pub ack_timeout: Duration,
}

impl Panel {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            navigation: NavigationStack::new(),
            logs: LogStore::new(config.max_log_entries),
            show_console: config.show_console,
            input: String::new(),
            default_url: config.default_url.clone(),
            ack_timeout: config.ack_timeout,
        }
    }

    /// The location under the cursor, or the default URL while history is empty.
    pub fn current_location(&self) -> &str {
        self.navigation.current().unwrap_or(&self.default_url)
    }

    /// Path part of the current location, as shown in the address field.
    pub fn display_path(&self) -> String {
        let location = self.current_location();
        match Url::parse(location) {
            Ok(url) => url.path().to_string(),
            Err(_) => location.to_string(),
        }
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            locations: self.navigation.locations().to_vec(),
            current_index: self.navigation.current_index(),
            current_location: self.current_location().to_string(),
            display_path: self.display_path(),
            can_go_back: self.navigation.can_go_back(),
            can_go_forward: self.navigation.can_go_forward(),
            logs: self.logs.entries(),
            show_console: self.show_console,
            input: self.input.clone(),
        }
    }
}

/// Read-only copy of the panel for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub locations: Vec<String>,
    pub current_index: isize,
    pub current_location: String,
    pub display_path: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub logs: Vec<LogEntry>,
    pub show_console: bool,
    pub input: String,
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_panel;

    #[test]
    fn test_panel_new_defaults() {
        let panel = test_panel();
        assert!(panel.show_console);
        assert!(panel.input.is_empty());
        assert!(panel.logs.is_empty());
        assert_eq!(panel.navigation.current_index(), -1);
    }

    #[test]
    fn test_empty_history_shows_default_url() {
        let panel = test_panel();
        assert_eq!(panel.current_location(), "https://codesandbox.io/");
        assert_eq!(panel.display_path(), "/");
    }

    #[test]
    fn test_display_path_strips_origin() {
        let mut panel = test_panel();
        panel
            .navigation
            .apply_url_change("https://abc.csb.app/about?tab=1");
        assert_eq!(panel.display_path(), "/about");

        panel.navigation.apply_url_change("about:blank#x");
        assert_eq!(panel.display_path(), "blank");

        panel.navigation.apply_url_change("not a url");
        assert_eq!(panel.display_path(), "not a url");
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut panel = test_panel();
        panel.navigation.apply_url_change("https://abc.csb.app/");
        panel.input.push_str("1+");
        let snap = panel.snapshot();
        assert_eq!(snap.locations, vec!["https://abc.csb.app/"]);
        assert_eq!(snap.current_index, 0);
        assert!(!snap.can_go_back);
        assert_eq!(snap.input, "1+");
    }
}
