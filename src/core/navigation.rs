//! # Navigation Stack
//!
//! Browser-style history for the preview frame.
//!
//! ```text
//! locations:  [A] [B] [C]
//!                  ^
//!            current_index = 1   (back is possible, forward is possible)
//! ```
//!
//! The sandbox owns the real page. Back/forward move the cursor right away
//! as a prediction and record it as pending; the sandbox's own `urlchange`
//! either confirms the prediction or replaces it. A prediction that is never
//! confirmed rolls back once it is older than the configured timeout, and
//! moves forward again if the confirmation shows up shortly after.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::sandbox::OutboundCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Back,
    Forward,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Back => -1,
            Direction::Forward => 1,
        }
    }

    fn command(self) -> OutboundCommand {
        match self {
            Direction::Back => OutboundCommand::UrlBack,
            Direction::Forward => OutboundCommand::UrlForward,
        }
    }
}

/// What a `urlchange` did to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlChange {
    /// Same page as the tip; nothing recorded.
    Unchanged,
    /// The sandbox landed where a back/forward request predicted.
    Acknowledged,
    /// The sandbox confirmed a prediction after it had been rolled back; the
    /// cursor returns to the predicted entry.
    Restored,
    /// Appended at the tip.
    Pushed,
    /// The cursor was behind the tip; forward history was dropped first.
    Branched { discarded: usize },
}

/// Most unconfirmed predictions kept at once. Older ones are forgotten first.
pub const MAX_PENDING_NAVIGATIONS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingNavigation {
    previous_index: usize,
    target_index: usize,
    expected_url: String,
    issued_at: Instant,
}

/// A prediction that was rolled back but may still be confirmed late.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpiredNavigation {
    target_index: usize,
    expected_url: String,
    expired_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NavigationStack {
    locations: Vec<String>,
    /// -1 only while `locations` is empty.
    current_index: isize,
    pending: VecDeque<PendingNavigation>,
    expired: VecDeque<ExpiredNavigation>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStack {
    pub fn new() -> Self {
        Self {
            locations: Vec::new(),
            current_index: -1,
            pending: VecDeque::new(),
            expired: VecDeque::new(),
        }
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn current_index(&self) -> isize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The location under the cursor, if any.
    pub fn current(&self) -> Option<&str> {
        usize::try_from(self.current_index)
            .ok()
            .and_then(|i| self.locations.get(i))
            .map(String::as_str)
    }

    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_index < self.last_index()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of back/forward requests still waiting for the sandbox.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn last_index(&self) -> isize {
        self.locations.len() as isize - 1
    }

    /// True if `url` is what the entry at `target` predicted.
    fn lands_on(&self, target: usize, expected: &str, url: &str) -> bool {
        expected == url && self.locations.get(target).is_some_and(|loc| loc == url)
    }

    /// Records a navigation reported by the sandbox.
    ///
    /// A report matching any queued prediction confirms it along with every
    /// older one, since the sandbox may only report where it ended up.
    pub fn apply_url_change(&mut self, url: &str) -> UrlChange {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|p| self.lands_on(p.target_index, &p.expected_url, url))
        {
            let target = self.pending[pos].target_index;
            self.pending.drain(..=pos);
            self.expired.clear();
            self.current_index = target as isize;
            return UrlChange::Acknowledged;
        }

        if let Some(pos) = self
            .expired
            .iter()
            .position(|e| self.lands_on(e.target_index, &e.expected_url, url))
        {
            let target = self.expired[pos].target_index;
            self.expired.drain(..=pos);
            self.pending.clear();
            debug!("Late confirmation of {url}, cursor back to {target}");
            self.current_index = target as isize;
            return UrlChange::Restored;
        }

        if !self.pending.is_empty() {
            debug!(
                "Sandbox navigated to {url} instead of the {} predicted location(s)",
                self.pending.len()
            );
            self.pending.clear();
        }
        self.expired.clear();

        let last = self.last_index();
        if self.current_index == last && self.locations.last().is_some_and(|tip| tip == url) {
            return UrlChange::Unchanged;
        }

        if self.current_index < last {
            let keep = (self.current_index + 1) as usize;
            let discarded = self.locations.len() - keep;
            self.locations.truncate(keep);
            self.locations.push(url.to_string());
            self.current_index += 1;
            return UrlChange::Branched { discarded };
        }

        self.locations.push(url.to_string());
        self.current_index += 1;
        UrlChange::Pushed
    }

    /// Moves the cursor one step and returns the command to send.
    ///
    /// Returns `None` when the clamped index doesn't move (empty stack,
    /// already at either end); nothing is sent in that case.
    pub fn request_go(&mut self, direction: Direction, now: Instant) -> Option<OutboundCommand> {
        if self.locations.is_empty() {
            return None;
        }
        let target = (self.current_index + direction.step()).clamp(0, self.last_index());
        if target == self.current_index {
            return None;
        }

        if self.pending.len() >= MAX_PENDING_NAVIGATIONS {
            self.pending.pop_front();
        }
        self.pending.push_back(PendingNavigation {
            previous_index: self.current_index as usize,
            target_index: target as usize,
            expected_url: self.locations[target as usize].clone(),
            issued_at: now,
        });
        self.current_index = target;
        Some(direction.command())
    }

    /// When `expire_pending` next has work to do: the oldest unconfirmed
    /// prediction expires, or the oldest rolled-back one stops accepting a
    /// late confirmation. A zero timeout disables both.
    pub fn pending_deadline(&self, timeout: Duration) -> Option<Instant> {
        if timeout.is_zero() {
            return None;
        }
        let pending = self.pending.front().map(|p| p.issued_at + timeout);
        let expired = self.expired.front().map(|e| e.expired_at + timeout);
        pending.into_iter().chain(expired).min()
    }

    /// Rolls the cursor back if the oldest prediction went unconfirmed for
    /// longer than `timeout`. Rolled-back predictions can still be confirmed
    /// by a matching `urlchange` for another `timeout`. Returns true when a
    /// rollback happened.
    pub fn expire_pending(&mut self, now: Instant, timeout: Duration) -> bool {
        if timeout.is_zero() {
            return false;
        }
        self.expired.retain(|e| now < e.expired_at + timeout);

        let Some(oldest) = self.pending.front() else {
            return false;
        };
        if now < oldest.issued_at + timeout {
            return false;
        }
        let previous = oldest.previous_index;
        self.expired
            .extend(self.pending.drain(..).map(|p| ExpiredNavigation {
                target_index: p.target_index,
                expected_url: p.expected_url,
                expired_at: now,
            }));
        while self.expired.len() > MAX_PENDING_NAVIGATIONS {
            self.expired.pop_front();
        }
        if previous < self.locations.len() {
            self.current_index = previous as isize;
        }
        true
    }
}
