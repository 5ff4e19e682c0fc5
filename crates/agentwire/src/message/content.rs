use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One item of a multi-modal message. Array order is display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredContent {
    Text { text: String },
    ImageUrl { url: String },
}

impl StructuredContent {
    pub fn text(text: impl Into<String>) -> Self {
        StructuredContent::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        StructuredContent::ImageUrl { url: url.into() }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, StructuredContent::ImageUrl { .. })
    }
}

/// Body of a transcript message: plain text, or a structured multi-modal list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(Vec<StructuredContent>),
}

impl MessageContent {
    /// Text used for command scanning. Structured content contributes its text
    /// items joined by newlines; images contribute nothing.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            MessageContent::Text(text) => Cow::Borrowed(text.as_str()),
            MessageContent::Structured(parts) => {
                let texts: Vec<&str> = parts
                    .iter()
                    .filter_map(|part| match part {
                        StructuredContent::Text { text } => Some(text.as_str()),
                        StructuredContent::ImageUrl { .. } => None,
                    })
                    .collect();
                Cow::Owned(texts.join("\n"))
            }
        }
    }

    /// Parses a text body as a JSON object. Structured content and non-object
    /// JSON return `None`.
    pub fn as_json_object(&self) -> Option<serde_json::Map<String, Value>> {
        match self {
            MessageContent::Text(text) => match serde_json::from_str::<Value>(text.trim()) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            },
            MessageContent::Structured(_) => None,
        }
    }

    pub fn structured(&self) -> Option<&[StructuredContent]> {
        match self {
            MessageContent::Structured(parts) => Some(parts.as_slice()),
            MessageContent::Text(_) => None,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<StructuredContent>> for MessageContent {
    fn from(parts: Vec<StructuredContent>) -> Self {
        MessageContent::Structured(parts)
    }
}
