//! Keyed item storage with optional expiry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    #[serde(rename = "itemId")]
    pub id: String,
    pub value: Value,
    /// Unix milliseconds after which the item is considered stale.
    #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Item {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now_millis: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now_millis)
    }
}

#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Fails with `Rejected` when the id already exists.
    async fn create(&self, item: Item) -> Result<(), CollaboratorError>;

    /// Fails with `NotFound` when the id does not exist.
    async fn update(&self, item: Item) -> Result<(), CollaboratorError>;

    async fn get(&self, id: &str) -> Result<Option<Item>, CollaboratorError>;

    /// Returns whether an item was removed.
    async fn delete(&self, id: &str) -> Result<bool, CollaboratorError>;

    async fn list(&self, prefix: &str) -> Result<Vec<Item>, CollaboratorError>;

    /// Update the item, or create it when absent.
    ///
    /// Best-effort and not atomic: concurrent writers to the same id race, and
    /// the last write wins.
    async fn upsert(&self, item: Item) -> Result<(), CollaboratorError> {
        match self.update(item.clone()).await {
            Err(CollaboratorError::NotFound(_)) => self.create(item).await,
            other => other,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryItemStore {
    data: RwLock<HashMap<String, Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(&self, item: Item) -> Result<(), CollaboratorError> {
        let mut data = self.data.write().await;
        if data.contains_key(&item.id) {
            return Err(CollaboratorError::Rejected(format!("item exists: {}", item.id)));
        }
        data.insert(item.id.clone(), item);
        Ok(())
    }

    async fn update(&self, item: Item) -> Result<(), CollaboratorError> {
        let mut data = self.data.write().await;
        match data.get_mut(&item.id) {
            Some(existing) => {
                *existing = item;
                Ok(())
            }
            None => Err(CollaboratorError::NotFound(item.id)),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Item>, CollaboratorError> {
        Ok(self.data.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, CollaboratorError> {
        Ok(self.data.write().await.remove(id).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<Item>, CollaboratorError> {
        let data = self.data.read().await;
        let mut items: Vec<Item> = data
            .values()
            .filter(|item| item.id.starts_with(prefix))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_rejects_existing_and_update_requires_existing() {
        let store = MemoryItemStore::new();
        store.create(Item::new("memory_a", json!(1))).await.unwrap();
        assert!(matches!(
            store.create(Item::new("memory_a", json!(2))).await,
            Err(CollaboratorError::Rejected(_))
        ));
        assert!(matches!(
            store.update(Item::new("memory_b", json!(2))).await,
            Err(CollaboratorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let store = MemoryItemStore::new();
        store.upsert(Item::new("memory_a", json!("first"))).await.unwrap();
        store.upsert(Item::new("memory_a", json!("second"))).await.unwrap();
        let item = store.get("memory_a").await.unwrap().unwrap();
        assert_eq!(item.value, json!("second"));
    }

    #[tokio::test]
    async fn list_filters_by_prefix_in_id_order() {
        let store = MemoryItemStore::new();
        store.upsert(Item::new("memory_b", json!(2))).await.unwrap();
        store.upsert(Item::new("memory_a", json!(1))).await.unwrap();
        store.upsert(Item::new("task_a", json!(3))).await.unwrap();
        let ids: Vec<String> = store
            .list("memory_")
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec!["memory_a", "memory_b"]);
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let store = MemoryItemStore::new();
        store.upsert(Item::new("memory_a", json!(1))).await.unwrap();
        assert!(store.delete("memory_a").await.unwrap());
        assert!(!store.delete("memory_a").await.unwrap());
    }

    #[test]
    fn expiry_check() {
        let mut item = Item::new("memory_a", json!(1));
        assert!(!item.is_expired(10));
        item.expires_at = Some(10);
        assert!(item.is_expired(10));
        assert!(!item.is_expired(9));
    }
}
