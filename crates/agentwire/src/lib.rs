pub mod agent;
pub mod builtins;
pub mod bus;
pub mod capabilities;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod protocol;
pub mod render;
pub mod server;
pub mod utils;
pub mod webhook;

pub use crate::agent::{Agent, ChatModel, ConversationStore, TurnSummary};
pub use crate::command::{Command, CommandTable, FnCommand, Payload, PayloadShape};
pub use crate::config::AgentConfig;
pub use crate::dispatch::{build_envelope, CommandExecutor, CycleOutcome, Envelope, EnvelopeBody};
pub use crate::error::{CollaboratorError, CommandError, CoreError, CoreResult, DispatchError};
pub use crate::message::{MessageContent, RawMessage, Role, StructuredContent, Transcript};
pub use crate::protocol::{CommandResult, Continuation, ControlMessage, ResponseEnvelope};
pub use crate::render::{render_transcript, MessageView, RenderOptions};
