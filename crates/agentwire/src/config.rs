//! Runtime configuration: a JSON file with defaults, overridden by
//! `AGENTWIRE_*` environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::DEFAULT_MAX_MESSAGE_BYTES;
use crate::error::ConfigError;

pub const CONFIG_FILENAME: &str = "agentwire.json";
pub const ENV_PREFIX: &str = "AGENTWIRE_";

const DEFAULT_MAX_MODEL_TURNS: usize = 8;
const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    pub bind_addr: SocketAddr,
    /// Model turns a single inbound message may trigger.
    pub max_model_turns: usize,
    /// Longer messages are rejected before scanning.
    pub max_message_bytes: usize,
    pub handler_timeout_secs: u64,
    /// Default expiry for `setMemory` items without their own.
    pub memory_expiration_minutes: Option<u64>,
    pub webhook_secret: Option<String>,
    /// Default destination for outbound messaging commands.
    pub telegram_chat_id: Option<String>,
    pub debug_render: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4840)),
            max_model_turns: DEFAULT_MAX_MODEL_TURNS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            handler_timeout_secs: DEFAULT_HANDLER_TIMEOUT_SECS,
            memory_expiration_minutes: None,
            webhook_secret: None,
            telegram_chat_id: None,
            debug_render: false,
        }
    }
}

impl AgentConfig {
    /// Reads `path` when it exists, then applies process environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Applies `AGENTWIRE_<FIELD>` overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (key, value))
        };

        if let Some((key, value)) = var("BIND_ADDR") {
            self.bind_addr = parse(&key, &value)?;
        }
        if let Some((key, value)) = var("MAX_MODEL_TURNS") {
            self.max_model_turns = parse(&key, &value)?;
        }
        if let Some((key, value)) = var("MAX_MESSAGE_BYTES") {
            self.max_message_bytes = parse(&key, &value)?;
        }
        if let Some((key, value)) = var("HANDLER_TIMEOUT_SECS") {
            self.handler_timeout_secs = parse(&key, &value)?;
        }
        if let Some((key, value)) = var("MEMORY_EXPIRATION_MINUTES") {
            self.memory_expiration_minutes = Some(parse(&key, &value)?);
        }
        if let Some((_, value)) = var("WEBHOOK_SECRET") {
            self.webhook_secret = Some(value);
        }
        if let Some((_, value)) = var("TELEGRAM_CHAT_ID") {
            self.telegram_chat_id = Some(value);
        }
        if let Some((key, value)) = var("DEBUG_RENDER") {
            self.debug_render = parse_flag(&key, &value)?;
        }
        Ok(())
    }

    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
