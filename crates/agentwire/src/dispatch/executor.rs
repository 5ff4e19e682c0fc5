//! Fan-out/fan-in execution of the commands found in one message.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use serde_json::json;

use super::policy::build_envelope;
use super::CycleOutcome;
use crate::command::{Command, CommandOccurrence, CommandTable};
use crate::error::DispatchError;
use crate::protocol::{kinds, CommandResult};

pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct CommandExecutor {
    table: Arc<CommandTable>,
    max_message_bytes: usize,
}

impl CommandExecutor {
    pub fn new(table: Arc<CommandTable>) -> Self {
        Self {
            table,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        &self.table
    }

    pub fn scan(&self, text: &str) -> Result<Vec<CommandOccurrence>, DispatchError> {
        if text.len() > self.max_message_bytes {
            return Err(DispatchError::MalformedInput(format!(
                "message is {} bytes (max {})",
                text.len(),
                self.max_message_bytes
            )));
        }
        let occurrences = self.table.match_all(text);
        tracing::debug!(count = occurrences.len(), "scanned message for commands");
        Ok(occurrences)
    }

    /// Runs every command in `text` concurrently.
    ///
    /// Results keep source order regardless of completion order. Handler
    /// failures become `ERROR` results; only an unscannable message fails.
    pub async fn execute(&self, text: &str) -> Result<Vec<CommandResult>, DispatchError> {
        let occurrences = self.scan(text)?;
        Ok(self.execute_occurrences(occurrences).await)
    }

    pub async fn execute_occurrences(&self, occurrences: Vec<CommandOccurrence>) -> Vec<CommandResult> {
        let futures = occurrences.into_iter().map(|occurrence| {
            let command = self.table.get(&occurrence.command).cloned();
            invoke_isolated(command, occurrence)
        });
        join_all(futures).await
    }

    /// Scan, execute and fold into an envelope. No commands means `Pass`.
    pub async fn run_cycle(&self, text: &str) -> Result<CycleOutcome, DispatchError> {
        let results = self.execute(text).await?;
        if results.is_empty() {
            return Ok(CycleOutcome::Pass);
        }
        Ok(CycleOutcome::Responded(build_envelope(results)))
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("table", &self.table)
            .field("max_message_bytes", &self.max_message_bytes)
            .finish()
    }
}

async fn invoke_isolated(command: Option<Arc<dyn Command>>, occurrence: CommandOccurrence) -> CommandResult {
    let name = occurrence.command;
    let Some(command) = command else {
        return error_result(&name, format!("command not registered: {name}"));
    };

    match AssertUnwindSafe(command.invoke(occurrence.payload)).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => {
            tracing::warn!(command = %name, error = %error, "command failed");
            error_result(&name, error.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::warn!(command = %name, error = %message, "command panicked");
            error_result(&name, message)
        }
    }
}

fn error_result(command: &str, message: String) -> CommandResult {
    CommandResult::new(kinds::ERROR, json!({ "message": message, "command": command }))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
