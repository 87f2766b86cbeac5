//! # Log Store
//!
//! The mirrored console: an ordered buffer of entries, oldest first.
//! Entries are never reordered. When a capacity is set the oldest entry is
//! evicted to make room for a new one.

use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

/// Level of a console line: the console method that produced it, or one of
/// the synthetic levels the panel adds for the command evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
    /// A command typed into the console input.
    Command,
    /// The value a command evaluated to.
    Result,
    /// Any other console method (`table`, `dir`, `group`, ...), kept verbatim.
    Other(String),
}

impl LogLevel {
    pub fn from_method(method: &str) -> LogLevel {
        match method {
            "log" => LogLevel::Log,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "debug" => LogLevel::Debug,
            "command" => LogLevel::Command,
            "result" => LogLevel::Result,
            other => LogLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
            LogLevel::Command => "command",
            LogLevel::Result => "result",
            LogLevel::Other(method) => method,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One line of console output or command history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub method: LogLevel,
    pub data: Vec<Value>,
}

/// The mirrored console, oldest entry first.
///
/// With a capacity, appending to a full store evicts the oldest entry, so
/// `clear()` followed by N appends holds `min(N, capacity)` entries. Only an
/// unbounded store keeps every line between clears.
#[derive(Debug, Clone, Default)]
pub struct LogStore {
    entries: VecDeque<LogEntry>,
    /// None = unbounded.
    capacity: Option<NonZeroUsize>,
}

impl LogStore {
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    pub fn append(&mut self, method: LogLevel, data: Vec<Value>) {
        if let Some(cap) = self.capacity {
            while self.entries.len() >= cap.get() {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(LogEntry { method, data });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Current contents in display order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}
