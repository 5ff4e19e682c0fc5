//! Conversation driver: appends inbound messages, runs dispatch cycles and
//! hands control back to the model while results ask for it.

pub mod store;

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

pub use store::{Conversation, ConversationStore};

use crate::bus::{Bus, CycleEvent};
use crate::command::CommandTable;
use crate::config::AgentConfig;
use crate::dispatch::{build_envelope, CommandExecutor, CycleOutcome};
use crate::error::CoreResult;
use crate::message::{MessageContent, RawMessage, Role, Transcript};
use crate::protocol::{Continuation, ControlMessage};

/// The language model producing agent messages. Lives outside this crate.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, transcript: &Transcript) -> CoreResult<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    pub conversation_id: String,
    /// Positions appended during this turn, in order.
    pub appended: Vec<usize>,
    /// Continuation of the last envelope; `None` when no command ran.
    pub continuation: Option<Continuation>,
    pub model_turns: usize,
    /// The turn stopped because the model-turn budget ran out.
    pub exhausted: bool,
}

pub struct Agent {
    executor: CommandExecutor,
    store: Arc<ConversationStore>,
    model: Option<Arc<dyn ChatModel>>,
    bus: Bus,
    max_model_turns: usize,
}

impl Agent {
    pub fn new(table: Arc<CommandTable>, config: &AgentConfig) -> Self {
        Self {
            executor: CommandExecutor::new(table).with_max_message_bytes(config.max_message_bytes),
            store: Arc::new(ConversationStore::new()),
            model: None,
            bus: Bus::default(),
            max_model_turns: config.max_model_turns,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        self.executor.table()
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Appends `content` and drives the conversation until nothing asks for
    /// another model turn.
    ///
    /// Each envelope lands directly after the message it answers. System
    /// messages are recorded but never scanned.
    pub async fn handle_inbound(
        &self,
        conversation_id: &str,
        role: Role,
        content: MessageContent,
    ) -> CoreResult<TurnSummary> {
        let conversation = self.store.conversation(conversation_id).await;
        let _turn = conversation.lock_turn().await;

        let mut summary = TurnSummary {
            conversation_id: conversation_id.to_string(),
            ..TurnSummary::default()
        };
        let mut position = conversation.append(role, content).await;
        summary.appended.push(position);

        loop {
            let Some(message) = conversation.get(position).await else {
                break;
            };
            let ask_model = match self.run_cycle(conversation_id, &message).await? {
                CycleOutcome::Pass => message.role == Role::User,
                CycleOutcome::Responded(envelope) => {
                    let continuation = envelope.continuation;
                    summary.continuation = Some(continuation);
                    let appended = conversation.append(Role::System, envelope.into_content()).await;
                    summary.appended.push(appended);
                    continuation == Continuation::ContinueModel
                }
            };
            if !ask_model {
                break;
            }
            let Some(model) = &self.model else {
                break;
            };
            if summary.model_turns >= self.max_model_turns {
                tracing::warn!(
                    conversation_id,
                    max_model_turns = self.max_model_turns,
                    "model turn budget exhausted"
                );
                let marker = conversation
                    .append(Role::System, ControlMessage::Continuation.into_content())
                    .await;
                summary.appended.push(marker);
                summary.exhausted = true;
                break;
            }

            let transcript = conversation.snapshot().await;
            let reply = model.complete(&transcript).await?;
            summary.model_turns += 1;
            position = conversation.append(Role::Agent, reply).await;
            summary.appended.push(position);
        }

        Ok(summary)
    }

    async fn run_cycle(&self, conversation_id: &str, message: &RawMessage) -> CoreResult<CycleOutcome> {
        if message.is_system() {
            return Ok(CycleOutcome::Pass);
        }
        let occurrences = self.executor.scan(&message.content.text())?;
        if occurrences.is_empty() {
            return Ok(CycleOutcome::Pass);
        }

        tracing::info!(
            conversation_id,
            position = message.position,
            commands = occurrences.len(),
            "dispatch cycle started"
        );
        self.bus.publish(CycleEvent::Started {
            conversation_id: conversation_id.to_string(),
            position: message.position,
        });

        let results = self.executor.execute_occurrences(occurrences).await;
        let envelope = build_envelope(results.clone());

        tracing::info!(
            conversation_id,
            position = message.position,
            continuation = ?envelope.continuation,
            "dispatch cycle finished"
        );
        self.bus.publish(CycleEvent::Finished {
            conversation_id: conversation_id.to_string(),
            position: message.position,
            continuation: envelope.continuation,
            results,
        });
        Ok(CycleOutcome::Responded(envelope))
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("executor", &self.executor)
            .field("has_model", &self.model.is_some())
            .field("max_model_turns", &self.max_model_turns)
            .finish()
    }
}
