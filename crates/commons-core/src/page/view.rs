use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Comment, ContentItem, ContentKind, Media, ModerationStatus, Step, Tag, User, UserComment,
};
use crate::permissions::PermissionPredicate;
use crate::ports::EngagementCounts;
use crate::view::{
    derive_tag_list, public_update_count, public_updates, scroll_target, should_expand_comments,
    to_user_comments,
};

use super::controller::Route;

/// Author or contributor badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCard {
    pub username: String,
    pub country: Option<String>,
    pub is_verified: bool,
}

/// A public update with its comment thread.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateView {
    pub id: Uuid,
    pub index: usize,
    pub title: String,
    pub description: String,
    pub images: Vec<Media>,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<UserComment>,
    pub show_comments: bool,
}

/// Everything the presentation layer needs to draw an article.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub id: Uuid,
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub moderation: ModerationStatus,
    pub cover_image: Option<Media>,
    pub steps: Vec<Step>,
    pub tag_list: Vec<Tag>,
    pub author: AuthorCard,
    pub contributors: Vec<AuthorCard>,
    pub comments: Vec<UserComment>,
    pub updates: Vec<UpdateView>,
    pub updates_count: usize,
    pub stats: EngagementCounts,
    pub is_editable: bool,
    pub is_deletable: bool,
    pub needs_moderation: bool,
    pub has_user_voted_useful: bool,
    pub has_user_subscribed: bool,
    pub show_useful_button: bool,
    pub scroll_to: Option<String>,
}

/// Search page to fall back to when a how-to slug does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRedirect {
    pub path: String,
    pub search: String,
    pub source: String,
    /// Relative URL with the search terms form-encoded.
    pub location: String,
}

impl SearchRedirect {
    pub fn for_missing_howto(slug: &str) -> Self {
        let path = "/how-to/".to_string();
        let search = slug.replace('-', " ");
        let source = "how-to-not-found".to_string();

        let encoded: String = url::form_urlencoded::byte_serialize(search.as_bytes()).collect();
        let location = format!("{path}?search={encoded}&source={source}");

        Self {
            path,
            search,
            source,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<SearchRedirect>,
}

/// Page lifecycle: `Loading` until the lookup settles.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState {
    Loading,
    Found(Box<ArticleView>),
    NotFound(NotFound),
    Failed { message: String },
}

impl PageState {
    pub fn view(&self) -> Option<&ArticleView> {
        match self {
            PageState::Found(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

/// Snapshot fetched for a found article.
#[derive(Debug, Clone)]
pub(super) struct LoadedArticle {
    pub item: ContentItem,
    pub comments: Vec<Comment>,
    pub tags: HashMap<String, Tag>,
    pub author: AuthorCard,
    pub contributors: Vec<AuthorCard>,
    pub counts: EngagementCounts,
}

impl ArticleView {
    pub(super) fn build(
        article: &LoadedArticle,
        viewer: Option<&User>,
        route: &Route,
        permissions: &PermissionPredicate,
    ) -> Self {
        let item = &article.item;
        let username = viewer.and_then(User::username);

        let updates = public_updates(item)
            .into_iter()
            .enumerate()
            .map(|(index, update)| UpdateView {
                id: update.id,
                index,
                title: update.title.clone(),
                description: update.description.clone(),
                images: update.images.clone(),
                created_at: update.created_at,
                comments: to_user_comments(&update.comments, viewer, item, permissions),
                show_comments: should_expand_comments(index, &route.fragment),
            })
            .collect();

        Self {
            id: item.id,
            kind: item.kind,
            slug: item.slug.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            moderation: item.moderation,
            cover_image: item.cover_image.clone(),
            steps: item.steps.clone(),
            tag_list: derive_tag_list(&item.tags, &article.tags),
            author: article.author.clone(),
            contributors: article.contributors.clone(),
            comments: to_user_comments(&article.comments, viewer, item, permissions),
            updates,
            updates_count: public_update_count(item),
            stats: article.counts,
            is_editable: permissions.can_edit(Some(item), viewer),
            is_deletable: permissions.can_delete(Some(item), viewer),
            needs_moderation: permissions.needs_moderation(item, viewer),
            has_user_voted_useful: username.is_some_and(|name| item.has_voted_useful(name)),
            has_user_subscribed: username.is_some_and(|name| item.is_subscribed(name)),
            show_useful_button: item.moderation == ModerationStatus::Accepted,
            scroll_to: scroll_target(&route.fragment),
        }
    }
}
