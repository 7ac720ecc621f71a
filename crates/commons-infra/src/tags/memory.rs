use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use commons_core::domain::Tag;
use commons_core::error::StoreError;
use commons_core::ports::TagCatalog;

/// Tag catalog held in memory.
#[derive(Default)]
pub struct InMemoryTagCatalog {
    tags: RwLock<HashMap<String, Tag>>,
}

impl InMemoryTagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tag.
    pub async fn insert(&self, tag: Tag) {
        self.tags.write().await.insert(tag.key.clone(), tag);
    }
}

#[async_trait]
impl TagCatalog for InMemoryTagCatalog {
    async fn all_tags_by_key(&self) -> Result<HashMap<String, Tag>, StoreError> {
        Ok(self.tags.read().await.clone())
    }
}
