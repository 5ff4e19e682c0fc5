//! Interfaces to the external collaborators command handlers talk to.
//!
//! Handlers receive a [`Capabilities`] bundle at construction time instead of
//! reaching for a global platform handle.

pub mod blob;
pub mod images;
pub mod items;
pub mod messaging;
pub mod schedule;
pub mod search;
pub mod unconfigured;
pub mod vector;

use std::sync::Arc;

pub use blob::{BlobStore, MemoryBlobStore};
pub use images::{ImageGenerator, ImageOptions};
pub use items::{Item, ItemStore, MemoryItemStore};
pub use messaging::Messenger;
pub use schedule::{MemoryTaskScheduler, ScheduledTask, TaskScheduler};
pub use search::{PageReader, SearchHit, WebSearch};
pub use unconfigured::Unconfigured;
pub use vector::{MemoryVectorIndex, VectorIndex, VectorMatch};

#[derive(Clone)]
pub struct Capabilities {
    pub items: Arc<dyn ItemStore>,
    pub search: Arc<dyn WebSearch>,
    pub pages: Arc<dyn PageReader>,
    pub images: Arc<dyn ImageGenerator>,
    pub blobs: Arc<dyn BlobStore>,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub vectors: Arc<dyn VectorIndex>,
    pub messenger: Arc<dyn Messenger>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

impl Capabilities {
    /// In-memory storage, scheduling and vector search; search, pages, image
    /// generation and messaging report `Unavailable` until replaced.
    pub fn in_memory() -> Self {
        Self {
            items: Arc::new(MemoryItemStore::new()),
            search: Arc::new(Unconfigured),
            pages: Arc::new(Unconfigured),
            images: Arc::new(Unconfigured),
            blobs: Arc::new(MemoryBlobStore),
            scheduler: Arc::new(MemoryTaskScheduler::new()),
            vectors: Arc::new(MemoryVectorIndex::new()),
            messenger: Arc::new(Unconfigured),
        }
    }
}
