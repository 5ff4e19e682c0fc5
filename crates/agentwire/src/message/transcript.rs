use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::content::MessageContent;
use crate::utils::time::now_rfc3339;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
            Role::Agent => "agent",
        }
    }
}

/// A message as stored in a transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct RawMessage {
    pub role: Role,
    pub content: MessageContent,
    pub position: usize,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl RawMessage {
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Append-only, ordered list of messages for one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<RawMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its position.
    pub fn append(&mut self, role: Role, content: impl Into<MessageContent>) -> usize {
        let position = self.messages.len();
        self.messages.push(RawMessage {
            role,
            content: content.into(),
            position,
            created_at: now_rfc3339(),
        });
        position
    }

    pub fn get(&self, position: usize) -> Option<&RawMessage> {
        self.messages.get(position)
    }

    pub fn last(&self) -> Option<&RawMessage> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[RawMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_sequential_positions() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.append(Role::User, "hi"), 0);
        assert_eq!(transcript.append(Role::Agent, "hello"), 1);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.get(1).unwrap().position, 1);
        assert_eq!(transcript.last().unwrap().role, Role::Agent);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }
}
