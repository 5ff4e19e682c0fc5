//! Builtin command set.
//!
//! Each module registers its commands against a shared [`BuiltinContext`]
//! holding the collaborator bundle and per-handler limits. Call
//! [`register_builtins`] once while building the command table.

pub mod image;
pub mod knowledge;
pub mod memory;
pub mod schedule;
pub mod telegram;
pub mod web;

use std::future::Future;
use std::time::Duration;

use crate::capabilities::Capabilities;
use crate::command::CommandTable;
use crate::config::AgentConfig;
use crate::error::{CollaboratorError, CommandError, DispatchError};

/// What builtin handlers capture at registration time.
#[derive(Debug, Clone)]
pub struct BuiltinContext {
    pub capabilities: Capabilities,
    /// Applied to every collaborator call a handler makes.
    pub timeout: Duration,
    pub memory_expiration_minutes: Option<u64>,
    pub default_chat_id: Option<String>,
}

impl BuiltinContext {
    pub fn new(capabilities: Capabilities, config: &AgentConfig) -> Self {
        Self {
            capabilities,
            timeout: config.handler_timeout(),
            memory_expiration_minutes: config.memory_expiration_minutes,
            default_chat_id: config.telegram_chat_id.clone(),
        }
    }
}

/// Register every builtin command.
pub fn register_builtins(
    table: &mut CommandTable,
    capabilities: Capabilities,
    config: &AgentConfig,
) -> Result<(), DispatchError> {
    let context = BuiltinContext::new(capabilities, config);
    memory::register(table, &context)?;
    web::register(table, &context)?;
    image::register(table, &context)?;
    schedule::register(table, &context)?;
    knowledge::register(table, &context)?;
    telegram::register(table, &context)?;
    tracing::debug!(commands = table.len(), "registered builtin commands");
    Ok(())
}

/// Runs one collaborator call under the handler timeout.
pub(crate) async fn call<T, F>(timeout: Duration, future: F) -> Result<T, CommandError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result.map_err(CommandError::from),
        Err(_) => Err(CommandError::Timeout(timeout)),
    }
}

/// `now` plus `minutes`, as epoch millis. Values a signed millisecond
/// timestamp cannot hold are rejected instead of wrapping.
pub(crate) fn minutes_after(now: u64, minutes: u64, field: &str) -> Result<u64, CommandError> {
    minutes
        .checked_mul(60_000)
        .and_then(|delay| now.checked_add(delay))
        .filter(|millis| i64::try_from(*millis).is_ok())
        .ok_or_else(|| CommandError::InvalidPayload(format!("'{field}' is too large")))
}

#[cfg(test)]
mod tests;
