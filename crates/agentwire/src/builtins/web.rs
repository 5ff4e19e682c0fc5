//! Web access: `googleSearch` and `webpageToText`.

use serde_json::json;

use super::{call, BuiltinContext};
use crate::command::{boxed_command_future, CommandTable, FnCommand, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::protocol::{kinds, CommandResult};

const DEFAULT_SEARCH_LIMIT: u64 = 10;
const MAX_SEARCH_LIMIT: u64 = 50;

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(google_search(context.clone()))?;
    table.register(webpage_to_text(context.clone()))?;
    Ok(())
}

fn google_search(context: BuiltinContext) -> FnCommand {
    FnCommand::new("googleSearch", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let query = payload
                .str_field_or_raw("query")
                .filter(|query| !query.trim().is_empty())
                .ok_or_else(|| CommandError::InvalidPayload("missing 'query'".to_string()))?
                .to_string();
            let limit = payload
                .u64_field("limit")
                .unwrap_or(DEFAULT_SEARCH_LIMIT)
                .clamp(1, MAX_SEARCH_LIMIT) as usize;

            let hits = call(context.timeout, context.capabilities.search.search(&query, limit)).await?;
            Ok(CommandResult::new(
                kinds::SEARCH_RESULTS,
                json!({ "query": query, "results": hits }),
            ))
        })
    })
    .with_icon("search")
}

fn webpage_to_text(context: BuiltinContext) -> FnCommand {
    FnCommand::new("webpageToText", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let url = payload
                .str_field_or_raw("url")
                .ok_or_else(|| CommandError::InvalidPayload("missing 'url'".to_string()))?
                .to_string();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CommandError::InvalidPayload(
                    "url must start with http:// or https://".to_string(),
                ));
            }
            let text = call(context.timeout, context.capabilities.pages.page_to_text(&url)).await?;
            Ok(CommandResult::new(kinds::PAGE_TEXT, json!({ "url": url, "text": text })))
        })
    })
    .with_icon("globe")
}
