//! Vector upsert/search.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    /// Similarity in `[0, 1]`, higher is closer.
    pub score: f32,
    pub text: String,
    pub metadata: Value,
}

#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, id: &str, text: &str, metadata: Value) -> Result<(), CollaboratorError>;

    /// Best matches first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<VectorMatch>, CollaboratorError>;
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    metadata: Value,
    terms: HashMap<String, f32>,
}

/// Term-frequency cosine similarity; a stand-in for an embedding index.
#[derive(Debug, Default)]
pub struct MemoryVectorIndex {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, id: &str, text: &str, metadata: Value) -> Result<(), CollaboratorError> {
        let entry = Entry {
            text: text.to_string(),
            metadata,
            terms: term_frequencies(text),
        };
        self.entries.write().await.insert(id.to_string(), entry);
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<VectorMatch>, CollaboratorError> {
        let query_terms = term_frequencies(query);
        let entries = self.entries.read().await;
        let mut matches: Vec<VectorMatch> = entries
            .iter()
            .filter_map(|(id, entry)| {
                let score = cosine(&query_terms, &entry.terms);
                (score > 0.0).then(|| VectorMatch {
                    id: id.clone(),
                    score,
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);
        Ok(matches)
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f32> {
    let mut terms = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
    {
        *terms.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    terms
}

fn cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    let dot: f32 = a
        .iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum();
    let norm = |m: &HashMap<String, f32>| m.values().map(|w| w * w).sum::<f32>().sqrt();
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}
