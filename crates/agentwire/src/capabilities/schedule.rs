//! Scheduled tasks keyed by their trigger timestamp.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Unix milliseconds at which the task fires. Unique per scheduler.
    pub timestamp: u64,
    pub message: String,
}

#[async_trait::async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn create(&self, task: ScheduledTask) -> Result<ScheduledTask, CollaboratorError>;

    /// Tasks ordered by timestamp.
    async fn list(&self) -> Result<Vec<ScheduledTask>, CollaboratorError>;

    async fn delete(&self, timestamp: u64) -> Result<bool, CollaboratorError>;
}

#[derive(Debug, Default)]
pub struct MemoryTaskScheduler {
    tasks: RwLock<BTreeMap<u64, ScheduledTask>>,
}

impl MemoryTaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TaskScheduler for MemoryTaskScheduler {
    async fn create(&self, task: ScheduledTask) -> Result<ScheduledTask, CollaboratorError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.timestamp) {
            return Err(CollaboratorError::Rejected(format!(
                "a task is already scheduled at {}",
                task.timestamp
            )));
        }
        tasks.insert(task.timestamp, task.clone());
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<ScheduledTask>, CollaboratorError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn delete(&self, timestamp: u64) -> Result<bool, CollaboratorError> {
        Ok(self.tasks.write().await.remove(&timestamp).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(timestamp: u64, message: &str) -> ScheduledTask {
        ScheduledTask {
            timestamp,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn tasks_list_in_timestamp_order() {
        let scheduler = MemoryTaskScheduler::new();
        scheduler.create(task(30, "later")).await.unwrap();
        scheduler.create(task(10, "sooner")).await.unwrap();
        let listed = scheduler.list().await.unwrap();
        assert_eq!(listed, vec![task(10, "sooner"), task(30, "later")]);
    }

    #[tokio::test]
    async fn duplicate_timestamp_is_rejected() {
        let scheduler = MemoryTaskScheduler::new();
        scheduler.create(task(10, "a")).await.unwrap();
        assert!(scheduler.create(task(10, "b")).await.is_err());
        assert!(scheduler.delete(10).await.unwrap());
        assert!(!scheduler.delete(10).await.unwrap());
    }
}
