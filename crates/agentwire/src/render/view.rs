use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::message::{MessageContent, Role, StructuredContent};
use crate::protocol::CommandResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show every message as-is, bypassing classification.
    pub debug: bool,
}

impl RenderOptions {
    /// Reads the debug flag from a raw query string such as `a=1&debug=true`.
    ///
    /// A bare `debug`, `debug=1` and `debug=true` enable it.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let debug = query.split('&').any(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).map(|k| k.into_owned()).unwrap_or_default();
            let value = urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_default();
            key == "debug" && is_truthy(&value)
        });
        Self { debug }
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "" | "1" | "true")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    /// No result has arrived yet.
    Pending,
    Success,
    Error,
}

/// One command occurrence shown as an icon, with its request and result on demand.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Indicator {
    pub command: String,
    pub icon: Option<String>,
    #[schema(value_type = Object)]
    pub request: Value,
    pub state: IndicatorState,
    pub result: Option<CommandResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    /// Rendered prose between commands.
    Prose(String),
    /// Adjacent commands grouped into one row.
    Indicators(Vec<Indicator>),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum MessageView {
    Hidden,
    /// The caller renders the raw content with its standard treatment.
    Passthrough { content: MessageContent },
    MultiModal {
        parts: Vec<StructuredContent>,
        /// Visual artifacts offered for download.
        downloadable: bool,
    },
    Commands { segments: Vec<Segment> },
}

impl MessageView {
    pub fn is_hidden(&self) -> bool {
        matches!(self, MessageView::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenderedMessage {
    pub position: usize,
    pub role: Role,
    #[serde(flatten)]
    pub view: MessageView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_forms() {
        assert!(RenderOptions::from_query("debug").debug);
        assert!(RenderOptions::from_query("?debug=1").debug);
        assert!(RenderOptions::from_query("conversationId=c1&debug=true").debug);
        assert!(RenderOptions::from_query("%64ebug=TRUE").debug);
        assert!(!RenderOptions::from_query("debug=0").debug);
        assert!(!RenderOptions::from_query("debugger=1").debug);
        assert!(!RenderOptions::from_query("").debug);
    }

    #[test]
    fn view_wire_shape() {
        let rendered = RenderedMessage {
            position: 2,
            role: Role::System,
            view: MessageView::Hidden,
        };
        let value = serde_json::to_value(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"position": 2, "role": "system", "view": "hidden"}));
    }
}
