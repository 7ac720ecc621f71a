//! In-memory content store.
//!
//! Holds how-tos and research items for a single process. Mutations publish
//! [`ItemChange`] notifications on a broadcast channel.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use commons_core::domain::{Comment, ContentItem, ContentKind, ModerationStatus};
use commons_core::error::StoreError;
use commons_core::ports::{
    ChangedField, ContentStore, EngagementCounts, ItemChange, MemberChange, SessionId,
};

/// In-memory content store using HashMaps behind async RwLocks.
///
/// Note: Data is lost on process restart.
pub struct InMemoryContentStore {
    items: RwLock<HashMap<Uuid, ContentItem>>,
    comments: RwLock<HashMap<Uuid, Vec<Comment>>>,
    active: Mutex<HashMap<SessionId, (ContentKind, String)>>,
    changes: broadcast::Sender<ItemChange>,
}

impl InMemoryContentStore {
    pub fn new(buffer_size: usize) -> Self {
        let (changes, _) = broadcast::channel(buffer_size.max(1));
        Self {
            items: RwLock::new(HashMap::new()),
            comments: RwLock::new(HashMap::new()),
            active: Mutex::new(HashMap::new()),
            changes,
        }
    }

    /// Add an item. Slugs must be unique per kind.
    pub async fn insert(&self, item: ContentItem) -> Result<(), StoreError> {
        let mut items = self.items.write().await;

        let clash = items
            .values()
            .any(|other| other.id != item.id && other.kind == item.kind && other.slug == item.slug);
        if clash {
            return Err(StoreError::Constraint(format!(
                "{} slug '{}' already exists",
                item.kind, item.slug
            )));
        }

        tracing::debug!(kind = %item.kind, slug = %item.slug, "Item stored");
        items.insert(item.id, item);
        Ok(())
    }

    pub async fn remove(&self, item_id: Uuid) -> Option<ContentItem> {
        let removed = self.items.write().await.remove(&item_id);
        self.comments.write().await.remove(&item_id);
        removed
    }

    /// Append an item-level comment.
    pub async fn add_comment(&self, item_id: Uuid, comment: Comment) -> Result<(), StoreError> {
        let items = self.items.read().await;
        let item = items.get(&item_id).ok_or(StoreError::NotFound)?;

        let mut comments = self.comments.write().await;
        comments.entry(item_id).or_default().push(comment);

        let change = change_for(item, ChangedField::Comments, None, &comments);
        drop(comments);
        drop(items);
        self.publish(change);
        Ok(())
    }

    /// Item a session is pointed at, if any.
    pub fn active(&self, session: SessionId) -> Option<(ContentKind, String)> {
        self.active_map().get(&session).cloned()
    }

    pub fn active_sessions(&self) -> usize {
        self.active_map().len()
    }

    fn active_map(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, (ContentKind, String)>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, change: ItemChange) {
        // Ignore send errors (no subscribers)
        let _ = self.changes.send(change);
    }

    /// Apply `mutate` to an item under the write lock and publish the
    /// resulting change. A rejected mutation leaves the item untouched.
    async fn mutate<T>(
        &self,
        item_id: Uuid,
        field: ChangedField,
        mutate: impl FnOnce(&mut ContentItem) -> Result<(T, Option<MemberChange>), StoreError>,
    ) -> Result<T, StoreError> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&item_id).ok_or(StoreError::NotFound)?;
        let (out, member) = mutate(item)?;
        item.modified_at = chrono::Utc::now();

        let comments = self.comments.read().await;
        let change = change_for(item, field, member, &comments);
        drop(comments);
        drop(items);

        self.publish(change);
        Ok(out)
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new(256)
    }
}

fn counts_for(item: &ContentItem, comments: &HashMap<Uuid, Vec<Comment>>) -> EngagementCounts {
    let item_level = comments.get(&item.id).map_or(0, Vec::len);
    let on_updates: usize = item
        .updates
        .iter()
        .filter(|u| u.is_public())
        .map(|u| u.comments.len())
        .sum();

    EngagementCounts {
        voted_useful: item.useful_votes.len(),
        comments: item_level + on_updates,
        subscribers: item.subscribers.len(),
    }
}

fn change_for(
    item: &ContentItem,
    field: ChangedField,
    member: Option<MemberChange>,
    comments: &HashMap<Uuid, Vec<Comment>>,
) -> ItemChange {
    ItemChange {
        item_id: item.id,
        field,
        counts: counts_for(item, comments),
        moderation: item.moderation,
        member,
    }
}

fn member(username: &str, present: bool) -> Option<MemberChange> {
    Some(MemberChange {
        username: username.to_string(),
        present,
    })
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn find_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> Result<Option<ContentItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .find(|item| item.kind == kind && item.slug == slug)
            .cloned())
    }

    fn set_active(&self, session: SessionId, kind: ContentKind, slug: Option<&str>) {
        let mut active = self.active_map();
        match slug {
            Some(slug) => {
                active.insert(session, (kind, slug.to_string()));
            }
            None => {
                active.remove(&session);
            }
        }
    }

    async fn toggle_vote(&self, item_id: Uuid, username: &str) -> Result<bool, StoreError> {
        self.mutate(item_id, ChangedField::Votes, |item| {
            let voted = !item.useful_votes.remove(username);
            if voted {
                item.useful_votes.insert(username.to_string());
            }
            Ok((voted, member(username, voted)))
        })
        .await
    }

    async fn add_subscriber(&self, item_id: Uuid, username: &str) -> Result<(), StoreError> {
        self.mutate(item_id, ChangedField::Subscribers, |item| {
            item.subscribers.insert(username.to_string());
            Ok(((), member(username, true)))
        })
        .await
    }

    async fn remove_subscriber(&self, item_id: Uuid, username: &str) -> Result<(), StoreError> {
        self.mutate(item_id, ChangedField::Subscribers, |item| {
            item.subscribers.remove(username);
            Ok(((), member(username, false)))
        })
        .await
    }

    async fn list_comments(&self, item: &ContentItem) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().await;
        Ok(comments.get(&item.id).cloned().unwrap_or_default())
    }

    async fn counts(&self, item_id: Uuid) -> Result<EngagementCounts, StoreError> {
        let items = self.items.read().await;
        let item = items.get(&item_id).ok_or(StoreError::NotFound)?;
        let comments = self.comments.read().await;
        Ok(counts_for(item, &comments))
    }

    async fn decide_moderation(
        &self,
        item_id: Uuid,
        accepted: bool,
    ) -> Result<ModerationStatus, StoreError> {
        self.mutate(item_id, ChangedField::Moderation, |item| {
            let status = item
                .moderation
                .decide(accepted)
                .map_err(|err| StoreError::Constraint(err.to_string()))?;
            item.moderation = status;
            Ok((status, None))
        })
        .await
    }

    fn observe(&self) -> broadcast::Receiver<ItemChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_core::domain::{Creator, Update, UpdateStatus};

    fn item(kind: ContentKind, slug: &str) -> ContentItem {
        ContentItem::new(
            kind,
            slug,
            slug,
            Creator {
                id: Uuid::new_v4(),
                username: "alice".into(),
                country: None,
            },
        )
    }

    #[tokio::test]
    async fn test_find_by_slug_respects_kind() {
        let store = InMemoryContentStore::default();
        store.insert(item(ContentKind::Howto, "oven")).await.unwrap();

        assert!(store.find_by_slug(ContentKind::Howto, "oven").await.unwrap().is_some());
        assert!(store.find_by_slug(ContentKind::Research, "oven").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let store = InMemoryContentStore::default();
        store.insert(item(ContentKind::Howto, "oven")).await.unwrap();

        let err = store.insert(item(ContentKind::Howto, "oven")).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        store.insert(item(ContentKind::Research, "oven")).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_vote_twice_restores_count() {
        let store = InMemoryContentStore::default();
        let oven = item(ContentKind::Howto, "oven");
        let id = oven.id;
        store.insert(oven).await.unwrap();

        let before = store.counts(id).await.unwrap().voted_useful;
        assert!(store.toggle_vote(id, "bob").await.unwrap());
        assert_eq!(store.counts(id).await.unwrap().voted_useful, before + 1);
        assert!(!store.toggle_vote(id, "bob").await.unwrap());
        assert_eq!(store.counts(id).await.unwrap().voted_useful, before);
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe_restores_membership() {
        let store = InMemoryContentStore::default();
        let mut research = item(ContentKind::Research, "dryer");
        research.subscribers.insert("carol".into());
        let id = research.id;
        store.insert(research).await.unwrap();

        store.add_subscriber(id, "bob").await.unwrap();
        store.remove_subscriber(id, "bob").await.unwrap();

        let found = store.find_by_slug(ContentKind::Research, "dryer").await.unwrap().unwrap();
        assert_eq!(found.subscribers.into_iter().collect::<Vec<_>>(), vec!["carol"]);
    }

    #[tokio::test]
    async fn test_mutations_publish_changes() {
        let store = InMemoryContentStore::default();
        let oven = item(ContentKind::Howto, "oven");
        let id = oven.id;
        store.insert(oven).await.unwrap();
        let mut feed = store.observe();

        store.toggle_vote(id, "bob").await.unwrap();

        let change = feed.recv().await.unwrap();
        assert_eq!(change.item_id, id);
        assert_eq!(change.field, ChangedField::Votes);
        assert_eq!(change.counts.voted_useful, 1);
        assert_eq!(
            change.member,
            Some(MemberChange {
                username: "bob".into(),
                present: true
            })
        );
    }

    #[tokio::test]
    async fn test_moderation_decided_once() {
        let store = InMemoryContentStore::default();
        let mut research = item(ContentKind::Research, "dryer");
        research.moderation = ModerationStatus::AwaitingModeration;
        let id = research.id;
        store.insert(research).await.unwrap();
        let mut feed = store.observe();

        assert_eq!(
            store.decide_moderation(id, true).await.unwrap(),
            ModerationStatus::Accepted
        );
        let err = store.decide_moderation(id, false).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let found = store.find_by_slug(ContentKind::Research, "dryer").await.unwrap().unwrap();
        assert_eq!(found.moderation, ModerationStatus::Accepted);

        assert_eq!(feed.recv().await.unwrap().moderation, ModerationStatus::Accepted);
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_comment_count_skips_hidden_updates() {
        let store = InMemoryContentStore::default();
        let mut research = item(ContentKind::Research, "dryer");
        let mut public = Update::new("public", UpdateStatus::Published);
        public.comments.push(Comment::new("bob", "bob", "nice"));
        let mut draft = Update::new("draft", UpdateStatus::Draft);
        draft.comments.push(Comment::new("bob", "bob", "hidden"));
        research.updates = vec![public, draft];
        let id = research.id;
        store.insert(research).await.unwrap();
        store.add_comment(id, Comment::new("carol", "carol", "top level")).await.unwrap();

        assert_eq!(store.counts(id).await.unwrap().comments, 2);
    }

    #[tokio::test]
    async fn test_active_pointer_is_per_session() {
        let store = InMemoryContentStore::default();
        let first = SessionId::new();
        let second = SessionId::new();

        store.set_active(first, ContentKind::Howto, Some("oven"));
        store.set_active(second, ContentKind::Research, Some("dryer"));
        store.set_active(first, ContentKind::Howto, None);

        assert_eq!(store.active(first), None);
        assert_eq!(
            store.active(second),
            Some((ContentKind::Research, "dryer".to_string()))
        );
        assert_eq!(store.active_sessions(), 1);
    }

    #[tokio::test]
    async fn test_mutating_missing_item_fails() {
        let store = InMemoryContentStore::default();
        let err = store.toggle_vote(Uuid::new_v4(), "bob").await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
