use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::Tag;
use crate::error::StoreError;

/// Tag catalog - resolves the tag keys stored on items.
#[async_trait]
pub trait TagCatalog: Send + Sync {
    /// Every known tag, keyed by its key.
    async fn all_tags_by_key(&self) -> Result<HashMap<String, Tag>, StoreError>;
}
