use crate::error::CollaboratorError;

/// Outbound delivery to a third-party messaging endpoint.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), CollaboratorError>;

    async fn send_photo(&self, chat_id: &str, photo_url: &str, caption: Option<&str>) -> Result<(), CollaboratorError>;
}
