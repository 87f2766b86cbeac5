//! # Message Decoder
//!
//! Console calls and evaluation results arrive encoded: plain JSON for
//! anything JSON can carry, and `{"@t": <type>, "data": ...}` wrappers for
//! values it can't (`undefined`, non-finite numbers, functions, ...).
//! Decoding flattens those wrappers into printable placeholders so the log
//! store only ever holds plain JSON.
//!
//! Decoding never fails hard for values: anything unreadable becomes a
//! placeholder. Console envelopes without a method are rejected so the
//! router can drop them.

use serde_json::{Map, Value};

use crate::sandbox::DecodeError;

/// First argument of a diagnostic the sandbox emits spuriously. Dropped on
/// exact match only.
pub const SUPPRESSED_DIAGNOSTIC: &str = "undefined used as a key, but it is not a string.";

/// Stand-in for a value that could not be decoded.
pub const PLACEHOLDER: &str = "[unreadable value]";

const TYPE_TAG: &str = "@t";

/// A decoded console call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleMessage {
    pub method: String,
    pub data: Vec<Value>,
}

impl ConsoleMessage {
    pub fn is_clear(&self) -> bool {
        self.method == "clear"
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self.data.first(), Some(Value::String(s)) if s == SUPPRESSED_DIAGNOSTIC)
    }
}

/// Decodes the `log` payload of a console frame. The payload may be the
/// envelope object itself or a JSON string holding it.
pub fn decode_console(raw: &Value) -> Result<ConsoleMessage, DecodeError> {
    let parsed;
    let envelope = match raw {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|e| DecodeError::Malformed(format!("console payload: {e}")))?;
            &parsed
        }
        other => other,
    };

    let Some(object) = envelope.as_object() else {
        return Err(DecodeError::NotAnObject);
    };
    let Some(method) = object.get("method").and_then(Value::as_str) else {
        return Err(DecodeError::Malformed("console payload has no method".into()));
    };

    let data = match object.get("data") {
        Some(Value::Array(args)) => args.iter().map(decode_value).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![decode_value(single)],
    };

    Ok(ConsoleMessage {
        method: method.to_string(),
        data,
    })
}

/// Decodes one encoded value.
pub fn decode_value(raw: &Value) -> Value {
    match raw {
        Value::Array(items) => Value::Array(items.iter().map(decode_value).collect()),
        Value::Object(object) => match object.get(TYPE_TAG) {
            Some(Value::String(tag)) => decode_tagged(tag, object.get("data")),
            Some(_) => Value::String(PLACEHOLDER.to_string()),
            None => Value::Object(
                object
                    .iter()
                    .map(|(k, v)| (k.clone(), decode_value(v)))
                    .collect::<Map<String, Value>>(),
            ),
        },
        scalar => scalar.clone(),
    }
}

fn decode_tagged(tag: &str, data: Option<&Value>) -> Value {
    let text = match tag {
        "undefined" => "undefined".to_string(),
        "Arithmetic" => match data.and_then(Value::as_u64) {
            Some(0) => "Infinity".to_string(),
            Some(1) => "-Infinity".to_string(),
            Some(2) => "-0".to_string(),
            Some(3) => "NaN".to_string(),
            _ => PLACEHOLDER.to_string(),
        },
        "Function" => {
            let name = data
                .and_then(|d| d.get("name"))
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .unwrap_or("(anonymous)");
            format!("[Function {name}]")
        }
        "Symbol" => match data.and_then(Value::as_str) {
            Some(desc) => format!("Symbol({desc})"),
            None => "Symbol()".to_string(),
        },
        // Unknown wrapper: keep whatever it carries.
        _ => return data.map(decode_value).unwrap_or(Value::Null),
    };
    Value::String(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    macro_rules! test_decode_value_rules {
        ( $($name:ident: $input:expr => $expected:expr,)+ ) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(decode_value(&$input), $expected);
                }
            )+
        };
    }

    test_decode_value_rules! {
        test_decode_value_plain_number: json!(2) => json!(2),
        test_decode_value_plain_string: json!("hi") => json!("hi"),
        test_decode_value_undefined: json!({"@t": "undefined"}) => json!("undefined"),
        test_decode_value_infinity: json!({"@t": "Arithmetic", "data": 0}) => json!("Infinity"),
        test_decode_value_nan: json!({"@t": "Arithmetic", "data": 3}) => json!("NaN"),
        test_decode_value_bad_arithmetic: json!({"@t": "Arithmetic", "data": 9}) => json!(PLACEHOLDER),
        test_decode_value_named_function: json!({"@t": "Function", "data": {"name": "render"}}) => json!("[Function render]"),
        test_decode_value_anonymous_function: json!({"@t": "Function", "data": {"name": ""}}) => json!("[Function (anonymous)]"),
        test_decode_value_unknown_wrapper: json!({"@t": "Map", "data": {"a": 1}}) => json!({"a": 1}),
        test_decode_value_non_string_tag: json!({"@t": 7}) => json!(PLACEHOLDER),
        test_decode_value_nested: json!({"xs": [1, {"@t": "undefined"}]}) => json!({"xs": [1, "undefined"]}),
    }

    #[test]
    fn test_decode_console_object_payload() {
        let msg = decode_console(&json!({"method": "warn", "data": ["careful", 1]})).unwrap();
        assert_eq!(msg.method, "warn");
        assert_eq!(msg.data, vec![json!("careful"), json!(1)]);
    }

    #[test]
    fn test_decode_console_string_payload() {
        let raw = json!(r#"{"method":"log","data":[{"@t":"Arithmetic","data":1}]}"#);
        let msg = decode_console(&raw).unwrap();
        assert_eq!(msg.method, "log");
        assert_eq!(msg.data, vec![json!("-Infinity")]);
    }

    #[test]
    fn test_decode_console_missing_data_is_empty() {
        let msg = decode_console(&json!({"method": "clear"})).unwrap();
        assert!(msg.is_clear());
        assert!(msg.data.is_empty());
    }

    #[test]
    fn test_decode_console_rejects_bad_envelopes() {
        assert!(decode_console(&json!("not json")).is_err());
        assert_eq!(decode_console(&json!(5)), Err(DecodeError::NotAnObject));
        assert!(matches!(
            decode_console(&json!({"data": []})),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_suppressed_diagnostic_exact_match_only() {
        let noisy = decode_console(&json!({"method": "error", "data": [SUPPRESSED_DIAGNOSTIC]})).unwrap();
        assert!(noisy.is_suppressed());

        let similar = decode_console(&json!({
            "method": "error",
            "data": ["undefined used as a key, but it is not a string"]
        }))
        .unwrap();
        assert!(!similar.is_suppressed());

        let later_arg = decode_console(&json!({"method": "log", "data": ["x", SUPPRESSED_DIAGNOSTIC]})).unwrap();
        assert!(!later_arg.is_suppressed());
    }
}
