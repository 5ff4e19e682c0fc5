//! Wire types exchanged through the transcript: command results, response
//! envelopes and control messages.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::message::{MessageContent, RawMessage, StructuredContent};

/// Result-type tags used by the builtin commands.
pub mod kinds {
    pub const ERROR: &str = "ERROR";
    pub const IMAGE: &str = "IMAGE";
    pub const MEMORY_SAVED: &str = "MEMORY_SAVED";
    pub const ITEM_DELETED: &str = "ITEM_DELETED";
    pub const MEMORY_CLEANED: &str = "MEMORY_CLEANED";
    pub const SEARCH_RESULTS: &str = "SEARCH_RESULTS";
    pub const PAGE_TEXT: &str = "PAGE_TEXT";
    pub const IMAGE_VIEW: &str = "IMAGE_VIEW";
    pub const TASK_SCHEDULED: &str = "TASK_SCHEDULED";
    pub const SCHEDULED_TASKS: &str = "SCHEDULED_TASKS";
    pub const TASK_DELETED: &str = "TASK_DELETED";
    pub const KNOWLEDGE_MATCHES: &str = "KNOWLEDGE_MATCHES";
    pub const MESSAGE_SENT: &str = "MESSAGE_SENT";
    pub const PHOTO_SENT: &str = "PHOTO_SENT";
}

/// Whether a dispatch cycle hands control back to the model or stops.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Continuation {
    #[default]
    ContinueModel,
    Terminate,
}

impl Continuation {
    /// Any side asking for another model turn wins.
    pub fn or(self, other: Continuation) -> Continuation {
        if self == Continuation::ContinueModel || other == Continuation::ContinueModel {
            Continuation::ContinueModel
        } else {
            Continuation::Terminate
        }
    }
}

/// Outcome of one handler invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CommandResult {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
    #[serde(default)]
    pub continuation: Continuation,
}

impl CommandResult {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
            continuation: Continuation::ContinueModel,
        }
    }

    pub fn terminate(mut self) -> Self {
        self.continuation = Continuation::Terminate;
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(kinds::ERROR, json!({ "message": message.into() }))
    }

    /// An error result is either tagged `ERROR` or carries an `error` field.
    pub fn is_error(&self) -> bool {
        self.kind == kinds::ERROR || self.data.get("error").is_some()
    }

    /// URL of a renderable image, when this result is a visual artifact.
    pub fn artifact_url(&self) -> Option<&str> {
        if self.kind != kinds::IMAGE {
            return None;
        }
        let url = self.data.get("imageUrl")?.as_str()?;
        let resolvable = url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with("data:image/");
        resolvable.then_some(url)
    }

    /// Multi-modal content carried by this result, if any item is an image.
    ///
    /// Accepts either a bare array as `data` or an array under `data.content`.
    pub fn multimodal_content(&self) -> Option<Vec<StructuredContent>> {
        let candidate = match &self.data {
            Value::Array(_) => &self.data,
            Value::Object(map) => map.get("content")?,
            _ => return None,
        };
        let parts: Vec<StructuredContent> = serde_json::from_value(candidate.clone()).ok()?;
        parts.iter().any(StructuredContent::is_image).then_some(parts)
    }

    /// Stand-in listed in a structured envelope's result summary for a result
    /// whose content was inlined into the list. Keeps kind and continuation.
    pub fn inlined(&self, images: usize) -> CommandResult {
        CommandResult {
            kind: self.kind.clone(),
            data: json!({ "inlineImages": images }),
            continuation: self.continuation,
        }
    }
}

/// System message summarizing one dispatch cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ResponseEnvelope {
    pub results: Vec<CommandResult>,
    #[serde(default)]
    pub continuation: Continuation,
}

impl ResponseEnvelope {
    /// The result summary closing a structured envelope: the last text part
    /// holding a `RESPONSE` body.
    pub fn from_structured(parts: &[StructuredContent]) -> Option<ResponseEnvelope> {
        parts.iter().rev().find_map(|part| match part {
            StructuredContent::Text { text } => {
                match ControlMessage::parse(&MessageContent::from(text.as_str()))? {
                    ControlMessage::Response(envelope) => Some(envelope),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    pub fn has_visual_artifact(&self) -> bool {
        self.results.iter().any(|result| result.artifact_url().is_some())
    }
}

/// JSON control bodies recognized in system messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Internal "no-op, keep waiting" marker. Never shown to a user.
    Continuation,
    /// A dispatch cycle started.
    DispatchStarted,
    /// A dispatch cycle finished with these results.
    Response(ResponseEnvelope),
}

impl ControlMessage {
    pub fn parse(content: &MessageContent) -> Option<ControlMessage> {
        let object = content.as_json_object()?;
        serde_json::from_value(Value::Object(object)).ok()
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn into_content(self) -> MessageContent {
        MessageContent::Text(self.to_json_string())
    }
}

/// System-originated start/finish marker of a dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleNotice {
    Started,
    Finished(ResponseEnvelope),
    /// Finished with a structured multi-modal envelope fed back to the model.
    FinishedStructured(Vec<StructuredContent>),
}

impl LifecycleNotice {
    pub fn from_message(message: &RawMessage) -> Option<LifecycleNotice> {
        if !message.is_system() {
            return None;
        }
        if let MessageContent::Structured(parts) = &message.content {
            return Some(LifecycleNotice::FinishedStructured(parts.clone()));
        }
        match ControlMessage::parse(&message.content)? {
            ControlMessage::DispatchStarted => Some(LifecycleNotice::Started),
            ControlMessage::Response(envelope) => Some(LifecycleNotice::Finished(envelope)),
            ControlMessage::Continuation => None,
        }
    }

    pub fn has_visual_artifact(&self) -> bool {
        match self {
            LifecycleNotice::Started => false,
            LifecycleNotice::Finished(envelope) => envelope.has_visual_artifact(),
            LifecycleNotice::FinishedStructured(parts) => parts.iter().any(StructuredContent::is_image),
        }
    }
}
