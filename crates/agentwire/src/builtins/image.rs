//! Images: `viewImage` feeds pictures back to the model, `createAIImage`
//! generates one and delivers it as the final answer.

use serde_json::{json, Value};
use uuid::Uuid;

use super::{call, BuiltinContext};
use crate::capabilities::ImageOptions;
use crate::command::{boxed_command_future, CommandTable, FnCommand, Payload, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::message::StructuredContent;
use crate::protocol::{kinds, CommandResult};

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(view_image())?;
    table.register(create_ai_image(context.clone()))?;
    Ok(())
}

fn view_image() -> FnCommand {
    FnCommand::new("viewImage", PayloadShape::Paired, |payload| {
        boxed_command_future(async move {
            let urls = image_urls(&payload);
            if urls.is_empty() {
                return Err(CommandError::InvalidPayload("missing 'urls'".to_string()));
            }
            let mut content = vec![StructuredContent::text("Image Uploaded Successfully")];
            content.extend(urls.into_iter().map(StructuredContent::image));
            Ok(CommandResult::new(kinds::IMAGE_VIEW, json!({ "content": content })))
        })
    })
    .with_icon("eye")
}

/// `{"urls": [..]}`, `{"urls": ".."}` or a bare URL.
fn image_urls(payload: &Payload) -> Vec<String> {
    let from_field = payload.as_object().and_then(|object| object.get("urls"));
    match from_field {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(url)) if !url.trim().is_empty() => vec![url.clone()],
        Some(_) => Vec::new(),
        None => match payload {
            Payload::Raw(url) if !url.is_empty() => vec![url.clone()],
            _ => Vec::new(),
        },
    }
}

fn create_ai_image(context: BuiltinContext) -> FnCommand {
    FnCommand::new("createAIImage", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let prompt = payload
                .str_field_or_raw("prompt")
                .filter(|prompt| !prompt.trim().is_empty())
                .ok_or_else(|| CommandError::InvalidPayload("missing 'prompt'".to_string()))?
                .to_string();
            let options = ImageOptions {
                aspect_ratio: payload.str_field("aspectRatio").map(str::to_string),
                count: 1,
            };

            let images = call(context.timeout, context.capabilities.images.generate(&prompt, &options)).await?;
            let encoded = images.into_iter().next().ok_or_else(|| {
                CommandError::Internal("image generator returned no images".to_string())
            })?;
            let file_name = format!("{}.png", Uuid::new_v4());
            let url = call(
                context.timeout,
                context.capabilities.blobs.upload(&encoded, &file_name, "image/png"),
            )
            .await?;

            Ok(CommandResult::new(kinds::IMAGE, json!({ "imageUrl": url, "prompt": prompt })).terminate())
        })
    })
    .with_icon("image")
}
