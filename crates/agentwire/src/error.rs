use std::time::Duration;

/// Errors raised while building the command table or scanning a message.
///
/// These indicate a defect in setup or input and abort the current cycle.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Failure raised by a single command handler.
///
/// The executor converts these into `ERROR` results; they never abort a cycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure reported by an external collaborator (item store, search, messaging...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Unified error type for the agent driver and HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("model error: {0}")]
    Model(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
