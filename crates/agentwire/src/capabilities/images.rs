use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageOptions {
    #[serde(rename = "aspectRatio", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns base64-encoded images.
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<Vec<String>, CollaboratorError>;
}
