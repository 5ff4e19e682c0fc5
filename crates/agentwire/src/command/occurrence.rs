use std::ops::Range;

use serde_json::{Map, Value};

use crate::error::CommandError;

/// Parsed payload of a command occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Self-closing tag; no payload.
    Empty,
    /// Payload text parsed as JSON.
    Json(Value),
    /// Payload text that is not JSON, trimmed.
    Raw(String),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// String field of a JSON object payload.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_object()?.get(key)?.as_str()
    }

    pub fn required_str(&self, key: &str) -> Result<&str, CommandError> {
        self.str_field(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CommandError::InvalidPayload(format!("missing '{key}'")))
    }

    /// The field when the payload is an object, else the raw text itself.
    ///
    /// Lets commands accept both `{"url": "..."}` and a bare value.
    pub fn str_field_or_raw(&self, key: &str) -> Option<&str> {
        match self {
            Payload::Raw(text) if !text.is_empty() => Some(text.as_str()),
            Payload::Json(Value::String(text)) if !text.is_empty() => Some(text.as_str()),
            _ => self.str_field(key),
        }
    }

    /// Unsigned integer field; numeric strings are accepted.
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        match self.as_object()?.get(key)? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Payload::Empty => Value::Null,
            Payload::Json(value) => value.clone(),
            Payload::Raw(text) => Value::String(text.clone()),
        }
    }
}

/// One matched tag in a message.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOccurrence {
    pub command: String,
    /// Text between the tags, untrimmed. `None` for self-closing tags.
    pub raw_payload: Option<String>,
    pub payload: Payload,
    /// Byte range of the whole tag in the scanned text.
    pub span: Range<usize>,
}

/// Attempts a JSON parse; falls back to the trimmed text. Never fails.
pub fn parse_payload(raw: &str) -> Payload {
    let trimmed = raw.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Raw(trimmed.to_string()),
    }
}
