//! `searchKnowledge`: ranked lookup in the vector index.

use serde_json::json;

use super::{call, BuiltinContext};
use crate::command::{boxed_command_future, CommandTable, FnCommand, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::protocol::{kinds, CommandResult};

const DEFAULT_TOP_K: u64 = 5;
const MAX_TOP_K: u64 = 50;

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(search_knowledge(context.clone()))
}

fn search_knowledge(context: BuiltinContext) -> FnCommand {
    FnCommand::new("searchKnowledge", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let query = payload
                .str_field_or_raw("query")
                .filter(|query| !query.trim().is_empty())
                .ok_or_else(|| CommandError::InvalidPayload("missing 'query'".to_string()))?
                .to_string();
            let top_k = payload.u64_field("topK").unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K) as usize;
            let matches = call(context.timeout, context.capabilities.vectors.search(&query, top_k)).await?;
            Ok(CommandResult::new(
                kinds::KNOWLEDGE_MATCHES,
                json!({ "query": query, "matches": matches }),
            ))
        })
    })
    .with_icon("book")
}
