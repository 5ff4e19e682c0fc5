use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CollaboratorError;

/// Durable upload of generated media.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores base64 content and returns a public URL.
    async fn upload(&self, base64_content: &str, file_name: &str, mime_type: &str) -> Result<String, CollaboratorError>;
}

/// Keeps nothing; returns `data:` URLs for the uploaded content.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore;

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, base64_content: &str, file_name: &str, mime_type: &str) -> Result<String, CollaboratorError> {
        let bytes = STANDARD
            .decode(base64_content)
            .map_err(|e| CollaboratorError::Rejected(format!("{file_name}: invalid base64: {e}")))?;
        if bytes.is_empty() {
            return Err(CollaboratorError::Rejected(format!("{file_name}: empty upload")));
        }
        Ok(format!("data:{mime_type};base64,{base64_content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_returns_data_url() {
        let url = MemoryBlobStore
            .upload("aGVsbG8=", "a.png", "image/png")
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn upload_rejects_invalid_base64() {
        let err = MemoryBlobStore.upload("***", "a.png", "image/png").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Rejected(_)));
    }
}
