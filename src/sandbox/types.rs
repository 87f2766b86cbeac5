use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A message emitted by the sandbox describing something that happened inside it.
///
/// Frames are tagged by their `type` field. Anything with a tag we don't know
/// lands in `Unknown` so newer sandboxes don't break older panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    #[serde(rename = "urlchange")]
    UrlChange { url: String },
    #[serde(rename = "eval-result")]
    EvalResult {
        #[serde(default)]
        result: Value,
        #[serde(default)]
        error: bool,
    },
    #[serde(rename = "console")]
    Console { log: Value },
    #[serde(other)]
    Unknown,
}

impl InboundEvent {
    /// Validates a raw frame at the boundary.
    pub fn from_frame(frame: Value) -> Result<InboundEvent, DecodeError> {
        if !frame.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        if frame.get("type").and_then(Value::as_str).is_none() {
            return Err(DecodeError::MissingTag);
        }
        serde_json::from_value(frame).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    /// Short tag name, used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            InboundEvent::UrlChange { .. } => "urlchange",
            InboundEvent::EvalResult { .. } => "eval-result",
            InboundEvent::Console { .. } => "console",
            InboundEvent::Unknown => "unknown",
        }
    }
}

/// A request sent to the sandbox. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundCommand {
    #[serde(rename = "urlback")]
    UrlBack,
    #[serde(rename = "urlforward")]
    UrlForward,
    #[serde(rename = "evaluate")]
    Evaluate { command: String },
    #[serde(rename = "refresh")]
    Refresh,
}

/// Errors produced while turning a raw frame or payload into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The frame was not a JSON object.
    NotAnObject,
    /// The frame had no string `type` field.
    MissingTag,
    /// A known tag with a body that didn't match its shape.
    Malformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NotAnObject => write!(f, "frame is not an object"),
            DecodeError::MissingTag => write!(f, "frame has no type tag"),
            DecodeError::Malformed(msg) => write!(f, "malformed frame: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

// ============================================================================
// Preview Tree
// ============================================================================

pub const DEFAULT_ENTRY: &str = "/index.js";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewFile {
    pub code: String,
}

/// The file and dependency tree the sandbox renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTree {
    pub files: BTreeMap<String, PreviewFile>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    pub entry: String,
    #[serde(default)]
    pub show_open_in_codesandbox: bool,
}

impl Default for PreviewTree {
    /// A single empty entry file with no dependencies.
    fn default() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            DEFAULT_ENTRY.to_string(),
            PreviewFile {
                code: String::new(),
            },
        );
        Self {
            files,
            dependencies: BTreeMap::new(),
            entry: DEFAULT_ENTRY.to_string(),
            show_open_in_codesandbox: false,
        }
    }
}
