//! Outbound delivery: `sendToTelegram`, `sendPhotoToTelegram`.
//!
//! Both end the cycle: the delivered message is the answer.

use serde_json::json;

use super::{call, BuiltinContext};
use crate::command::{boxed_command_future, CommandTable, FnCommand, Payload, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::protocol::{kinds, CommandResult};

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(send_to_telegram(context.clone()))?;
    table.register(send_photo_to_telegram(context.clone()))?;
    Ok(())
}

fn chat_id(payload: &Payload, context: &BuiltinContext) -> Result<String, CommandError> {
    payload
        .as_object()
        .and_then(|object| object.get("chatId"))
        .and_then(|value| match value {
            serde_json::Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .or_else(|| context.default_chat_id.clone())
        .ok_or_else(|| CommandError::InvalidPayload("missing 'chatId' and no default chat configured".to_string()))
}

fn send_to_telegram(context: BuiltinContext) -> FnCommand {
    FnCommand::new("sendToTelegram", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let text = payload
                .str_field_or_raw("text")
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| CommandError::InvalidPayload("missing 'text'".to_string()))?
                .to_string();
            let chat_id = chat_id(&payload, &context)?;
            call(context.timeout, context.capabilities.messenger.send_message(&chat_id, &text)).await?;
            Ok(CommandResult::new(kinds::MESSAGE_SENT, json!({ "chatId": chat_id })).terminate())
        })
    })
    .with_icon("send")
}

fn send_photo_to_telegram(context: BuiltinContext) -> FnCommand {
    FnCommand::new("sendPhotoToTelegram", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let photo_url = payload.required_str("photoUrl")?.to_string();
            let caption = payload.str_field("caption").map(str::to_string);
            let chat_id = chat_id(&payload, &context)?;
            call(
                context.timeout,
                context
                    .capabilities
                    .messenger
                    .send_photo(&chat_id, &photo_url, caption.as_deref()),
            )
            .await?;
            Ok(CommandResult::new(
                kinds::PHOTO_SENT,
                json!({ "chatId": chat_id, "photoUrl": photo_url }),
            )
            .terminate())
        })
    })
    .with_icon("send")
}
