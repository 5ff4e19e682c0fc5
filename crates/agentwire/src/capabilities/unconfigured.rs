//! Placeholder for collaborators that have no backend wired in.

use super::{ImageGenerator, ImageOptions, Messenger, PageReader, SearchHit, WebSearch};
use crate::error::CollaboratorError;

/// Fails every call with `Unavailable`, naming the missing capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

fn unavailable(capability: &str) -> CollaboratorError {
    CollaboratorError::Unavailable(format!("{capability} is not configured"))
}

#[async_trait::async_trait]
impl WebSearch for Unconfigured {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, CollaboratorError> {
        Err(unavailable("web search"))
    }
}

#[async_trait::async_trait]
impl PageReader for Unconfigured {
    async fn page_to_text(&self, _url: &str) -> Result<String, CollaboratorError> {
        Err(unavailable("page reader"))
    }
}

#[async_trait::async_trait]
impl ImageGenerator for Unconfigured {
    async fn generate(&self, _prompt: &str, _options: &ImageOptions) -> Result<Vec<String>, CollaboratorError> {
        Err(unavailable("image generation"))
    }
}

#[async_trait::async_trait]
impl Messenger for Unconfigured {
    async fn send_message(&self, _chat_id: &str, _text: &str) -> Result<(), CollaboratorError> {
        Err(unavailable("messaging"))
    }

    async fn send_photo(&self, _chat_id: &str, _photo_url: &str, _caption: Option<&str>) -> Result<(), CollaboratorError> {
        Err(unavailable("messaging"))
    }
}
