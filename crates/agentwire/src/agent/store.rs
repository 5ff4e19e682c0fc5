use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::message::{MessageContent, RawMessage, Role, Transcript};

/// One conversation's transcript plus the lock that serializes its turns.
#[derive(Debug, Default)]
pub struct Conversation {
    transcript: RwLock<Transcript>,
    turn: Mutex<()>,
}

impl Conversation {
    pub async fn append(&self, role: Role, content: impl Into<MessageContent>) -> usize {
        self.transcript.write().await.append(role, content)
    }

    pub async fn get(&self, position: usize) -> Option<RawMessage> {
        self.transcript.read().await.get(position).cloned()
    }

    pub async fn snapshot(&self) -> Transcript {
        self.transcript.read().await.clone()
    }

    /// Held for a whole inbound turn so no other producer can slip a message
    /// between a scanned message and its envelope. Readers are not blocked.
    pub async fn lock_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }
}

/// In-memory map of conversations.
///
/// Nothing is evicted on its own: the map grows with every new conversation id
/// until [`ConversationStore::remove`] is called. Persistence and retention
/// belong to whoever embeds the agent.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create.
    pub async fn conversation(&self, id: &str) -> Arc<Conversation> {
        if let Some(conversation) = self.conversations.read().await.get(id) {
            return conversation.clone();
        }
        self.conversations
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .clone()
    }

    pub async fn transcript(&self, id: &str) -> Option<Transcript> {
        let conversation = self.conversations.read().await.get(id).cloned()?;
        Some(conversation.snapshot().await)
    }

    /// Drops a conversation. A turn already holding it finishes on its own
    /// handle; the next message under the same id starts a fresh transcript.
    pub async fn remove(&self, id: &str) -> bool {
        self.conversations.write().await.remove(id).is_some()
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.conversations.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
