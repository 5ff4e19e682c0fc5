use serde::Serialize;
use tokio::sync::broadcast;

use crate::protocol::{CommandResult, Continuation};

/// Dispatch cycle lifecycle, published instead of being written to transcripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleEvent {
    #[serde(rename_all = "camelCase")]
    Started {
        conversation_id: String,
        position: usize,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        conversation_id: String,
        position: usize,
        continuation: Continuation,
        results: Vec<CommandResult>,
    },
}

impl CycleEvent {
    pub fn conversation_id(&self) -> &str {
        match self {
            CycleEvent::Started { conversation_id, .. } | CycleEvent::Finished { conversation_id, .. } => {
                conversation_id
            }
        }
    }
}

/// Fan-out of cycle events to live viewers. Slow subscribers lag and lose the
/// oldest events; the transcript stays authoritative.
#[derive(Clone)]
pub struct Bus {
    events: broadcast::Sender<CycleEvent>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CycleEvent> {
        self.events.subscribe()
    }

    /// Number of subscribers reached. Zero is normal when nobody is watching.
    pub fn publish(&self, event: CycleEvent) -> usize {
        match self.events.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(conversation_id = event.conversation_id(), "no bus subscribers");
                0
            }
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}
