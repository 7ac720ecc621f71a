//! Content store port - the owner of persisted article state.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{Comment, ContentItem, ContentKind, ModerationStatus};
use crate::error::StoreError;

/// Handle for one mounted page. Scopes the "active item" pointer to a single
/// navigation instead of the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Engagement counters shown next to an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngagementCounts {
    pub voted_useful: usize,
    pub comments: usize,
    pub subscribers: usize,
}

/// Item fields a page can declare interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Votes,
    Subscribers,
    Comments,
    Moderation,
}

/// One member joining or leaving the voters or subscribers of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChange {
    pub username: String,
    pub present: bool,
}

/// Change notification published by a store after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    pub item_id: Uuid,
    pub field: ChangedField,
    pub counts: EngagementCounts,
    pub moderation: ModerationStatus,
    /// Set for `Votes` and `Subscribers` changes.
    pub member: Option<MemberChange>,
}

/// Content store trait - abstraction over how-to and research storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Look up an item by its slug.
    async fn find_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> Result<Option<ContentItem>, StoreError>;

    /// Point `session` at the item it displays, or clear the pointer with `None`.
    fn set_active(&self, session: SessionId, kind: ContentKind, slug: Option<&str>);

    /// Flip `username`'s useful vote. Returns whether the user now has a vote.
    async fn toggle_vote(&self, item_id: Uuid, username: &str) -> Result<bool, StoreError>;

    async fn add_subscriber(&self, item_id: Uuid, username: &str) -> Result<(), StoreError>;

    async fn remove_subscriber(&self, item_id: Uuid, username: &str) -> Result<(), StoreError>;

    /// Item-level comments, oldest first.
    async fn list_comments(&self, item: &ContentItem) -> Result<Vec<Comment>, StoreError>;

    async fn counts(&self, item_id: Uuid) -> Result<EngagementCounts, StoreError>;

    /// Record a moderator decision and return the new status. Fails with
    /// `Constraint` once the item is no longer awaiting moderation.
    async fn decide_moderation(
        &self,
        item_id: Uuid,
        accepted: bool,
    ) -> Result<ModerationStatus, StoreError>;

    /// Subscribe to change notifications for all items.
    fn observe(&self) -> broadcast::Receiver<ItemChange>;
}
