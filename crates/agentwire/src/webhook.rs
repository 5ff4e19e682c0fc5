//! Normalizes third-party bot updates into inbound conversation messages.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CoreError, CoreResult};
use crate::message::{MessageContent, Role};

pub const TELEGRAM_CHANNEL: &str = "telegram";
pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
    pub edited_message: Option<TelegramMessage>,
    pub channel_post: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub sender_chat: Option<TelegramChat>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TelegramChat {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
}

/// A message from an external channel, ready to enter a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub channel: String,
    pub chat_id: String,
    pub sender: String,
    pub text: String,
}

impl InboundEvent {
    /// One conversation per external chat.
    pub fn conversation_id(&self) -> String {
        format!("{}_{}", self.channel, self.chat_id)
    }

    /// Recorded as a user message naming where it came from.
    pub fn into_message(self) -> (Role, MessageContent) {
        let text = format!(
            "[{} chat {} from {}]\n{}",
            self.channel, self.chat_id, self.sender, self.text
        );
        (Role::User, MessageContent::Text(text))
    }
}

/// `None` for updates with nothing to say (joins, stickers, reactions...).
pub fn normalize_telegram(update: TelegramUpdate) -> Option<InboundEvent> {
    let message = update
        .message
        .or(update.edited_message)
        .or(update.channel_post)?;
    let text = message
        .text
        .clone()
        .or_else(|| message.caption.clone())
        .filter(|text| !text.trim().is_empty())?;
    Some(InboundEvent {
        channel: TELEGRAM_CHANNEL.to_string(),
        chat_id: message.chat.id.to_string(),
        sender: sender_name(&message),
        text,
    })
}

fn sender_name(message: &TelegramMessage) -> String {
    if let Some(user) = &message.from {
        if let Some(username) = &user.username {
            return format!("@{username}");
        }
        if let Some(name) = &user.first_name {
            return name.clone();
        }
        return user.id.to_string();
    }
    let chat = message.sender_chat.as_ref().unwrap_or(&message.chat);
    chat.title
        .clone()
        .or_else(|| chat.username.as_ref().map(|username| format!("@{username}")))
        .unwrap_or_else(|| chat.id.to_string())
}

/// Checks the shared secret when one is configured.
pub fn verify_secret(expected: Option<&str>, provided: Option<&str>) -> CoreResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match provided {
        Some(provided) if constant_time_eq(expected.as_bytes(), provided.as_bytes()) => Ok(()),
        Some(_) => Err(CoreError::Unauthorized("webhook secret mismatch".to_string())),
        None => Err(CoreError::Unauthorized("missing webhook secret".to_string())),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
