use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, CollaboratorError>;
}

/// Page-to-text extraction.
#[async_trait::async_trait]
pub trait PageReader: Send + Sync {
    async fn page_to_text(&self, url: &str) -> Result<String, CollaboratorError>;
}
