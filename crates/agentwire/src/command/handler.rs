use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::occurrence::Payload;
use crate::error::CommandError;
use crate::protocol::CommandResult;

/// Tag shape a command is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadShape {
    /// `<name>PAYLOAD</name>`
    Paired,
    /// `<name/>` or `<name />`
    SelfClosing,
}

pub type CommandFuture = Pin<Box<dyn Future<Output = Result<CommandResult, CommandError>> + Send>>;

pub type CommandExecute = Arc<dyn Fn(Payload) -> CommandFuture + Send + Sync>;

pub fn boxed_command_future<F>(future: F) -> CommandFuture
where
    F: Future<Output = Result<CommandResult, CommandError>> + Send + 'static,
{
    Box::pin(future)
}

/// A named command the model can emit as a tag.
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn shape(&self) -> PayloadShape;

    /// Display hint for renderers.
    fn icon(&self) -> Option<&str> {
        None
    }

    async fn invoke(&self, payload: Payload) -> Result<CommandResult, CommandError>;
}

/// Command backed by a closure returning a boxed future.
#[derive(Clone)]
pub struct FnCommand {
    name: String,
    shape: PayloadShape,
    icon: Option<String>,
    execute: CommandExecute,
}

impl FnCommand {
    pub fn new<F>(name: impl Into<String>, shape: PayloadShape, execute: F) -> Self
    where
        F: Fn(Payload) -> CommandFuture + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            shape,
            icon: None,
            execute: Arc::new(execute),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

impl std::fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

#[async_trait::async_trait]
impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> PayloadShape {
        self.shape
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    async fn invoke(&self, payload: Payload) -> Result<CommandResult, CommandError> {
        (self.execute)(payload).await
    }
}
