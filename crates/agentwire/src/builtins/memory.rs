//! Keyed memory: `setMemory`, `deleteItem`, `cleanupMemory`.

use serde_json::json;

use super::{call, minutes_after, BuiltinContext};
use crate::capabilities::Item;
use crate::command::{boxed_command_future, CommandTable, FnCommand, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::protocol::{kinds, CommandResult};
use crate::utils::time::now_millis;

/// Every memory item id starts with this.
pub const MEMORY_PREFIX: &str = "memory_";

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(set_memory(context.clone()))?;
    table.register(delete_item(context.clone()))?;
    table.register(cleanup_memory(context.clone()))?;
    Ok(())
}

fn set_memory(context: BuiltinContext) -> FnCommand {
    FnCommand::new("setMemory", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let id = payload.required_str("itemId")?.to_string();
            if !id.starts_with(MEMORY_PREFIX) {
                return Err(CommandError::InvalidPayload(format!(
                    "itemId must start with '{MEMORY_PREFIX}'"
                )));
            }
            let value = payload
                .as_object()
                .and_then(|object| object.get("value"))
                .cloned()
                .ok_or_else(|| CommandError::InvalidPayload("missing 'value'".to_string()))?;
            let expiration = payload
                .u64_field("expirationInMinutes")
                .or(context.memory_expiration_minutes);

            let mut item = Item::new(id.clone(), value);
            item.expires_at = expiration
                .map(|minutes| minutes_after(now_millis(), minutes, "expirationInMinutes"))
                .transpose()?;
            let expires_at = item.expires_at;
            call(context.timeout, context.capabilities.items.upsert(item)).await?;

            Ok(CommandResult::new(
                kinds::MEMORY_SAVED,
                json!({ "itemId": id, "expiresAt": expires_at }),
            ))
        })
    })
    .with_icon("memory")
}

fn delete_item(context: BuiltinContext) -> FnCommand {
    FnCommand::new("deleteItem", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let id = payload
                .str_field_or_raw("itemId")
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| CommandError::InvalidPayload("missing 'itemId'".to_string()))?
                .to_string();
            let deleted = call(context.timeout, context.capabilities.items.delete(&id)).await?;
            Ok(CommandResult::new(
                kinds::ITEM_DELETED,
                json!({ "itemId": id, "deleted": deleted }),
            ))
        })
    })
    .with_icon("trash")
}

fn cleanup_memory(context: BuiltinContext) -> FnCommand {
    FnCommand::new("cleanupMemory", PayloadShape::SelfClosing, move |_payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let items = &context.capabilities.items;
            let now = now_millis();
            let expired: Vec<String> = call(context.timeout, items.list(MEMORY_PREFIX))
                .await?
                .into_iter()
                .filter(|item| item.is_expired(now))
                .map(|item| item.id)
                .collect();

            let mut deleted = 0usize;
            for id in &expired {
                if call(context.timeout, items.delete(id)).await? {
                    deleted += 1;
                }
            }
            tracing::debug!(deleted, "cleaned up expired memory items");
            Ok(CommandResult::new(kinds::MEMORY_CLEANED, json!({ "deleted": deleted })))
        })
    })
    .with_icon("broom")
}
