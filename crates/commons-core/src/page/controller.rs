use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ContentItem, ContentKind, User};
use crate::error::StoreError;
use crate::permissions::PermissionPredicate;
use crate::ports::{
    AnalyticsSink, ContentStore, MetadataSink, PageMetadata, SessionId, TagCatalog,
    UserRepository,
};
use crate::view::latest_update_image;

use super::actions::ActionQueue;
use super::view::{ArticleView, AuthorCard, LoadedArticle, NotFound, PageState, SearchRedirect};

/// Collaborators a page talks to.
#[derive(Clone)]
pub struct PageDeps {
    pub store: Arc<dyn ContentStore>,
    pub users: Arc<dyn UserRepository>,
    pub tags: Arc<dyn TagCatalog>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub metadata: Arc<dyn MetadataSink>,
    pub permissions: PermissionPredicate,
}

/// Navigation target: the slug path parameter and the URL fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub slug: String,
    pub fragment: String,
}

impl Route {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            fragment: String::new(),
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = fragment.into();
        self
    }
}

/// A lookup started by [`ArticlePage::begin`].
#[derive(Debug, Clone)]
pub struct PendingLoad {
    generation: u64,
    kind: ContentKind,
    route: Route,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn route(&self) -> &Route {
        &self.route
    }
}

/// Settled lookup, tagged with the navigation that started it.
#[derive(Debug)]
pub struct LoadResult {
    generation: u64,
    slug: String,
    outcome: LoadOutcome,
}

impl LoadResult {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
enum LoadOutcome {
    Found(Box<LoadedArticle>),
    Missing,
    Failed(String),
}

/// A load result arrived after the page moved on.
#[derive(Debug, thiserror::Error)]
#[error("load from navigation {stale} superseded by navigation {current}")]
pub struct StaleLoad {
    pub stale: u64,
    pub current: u64,
}

/// One mounted article page.
pub struct ArticlePage {
    pub(super) kind: ContentKind,
    pub(super) deps: PageDeps,
    pub(super) session: SessionId,
    pub(super) viewer: Option<User>,
    pub(super) generation: u64,
    pub(super) route: Route,
    pub(super) article: Option<LoadedArticle>,
    pub(super) state: PageState,
    pub(super) mounted: bool,
    pub(super) actions: ActionQueue,
}

impl ArticlePage {
    pub fn new(kind: ContentKind, deps: PageDeps, viewer: Option<User>) -> Self {
        Self {
            kind,
            deps,
            session: SessionId::new(),
            viewer,
            generation: 0,
            route: Route::default(),
            article: None,
            state: PageState::Loading,
            mounted: false,
            actions: ActionQueue::default(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The resolved item, once found.
    pub fn item(&self) -> Option<&ContentItem> {
        self.article.as_ref().map(|a| &a.item)
    }

    /// Navigate to `route`. The previous mount, if any, is cleaned up first.
    pub fn begin(&mut self, route: Route) -> PendingLoad {
        self.leave();
        self.generation += 1;
        self.route = route.clone();
        self.article = None;
        self.state = PageState::Loading;
        self.mounted = true;

        tracing::debug!(
            kind = %self.kind,
            slug = %route.slug,
            generation = self.generation,
            "Page navigation started"
        );

        PendingLoad {
            generation: self.generation,
            kind: self.kind,
            route,
        }
    }

    /// Resolve a pending navigation. Does not touch the page, so it can run
    /// concurrently with further navigations.
    pub async fn load(deps: &PageDeps, pending: PendingLoad) -> LoadResult {
        let slug = pending.route.slug;
        let outcome = match fetch(deps, pending.kind, &slug).await {
            Ok(Some(article)) => LoadOutcome::Found(Box::new(article)),
            Ok(None) => LoadOutcome::Missing,
            Err(err) => {
                tracing::error!(kind = %pending.kind, slug = %slug, error = %err, "Article lookup failed");
                LoadOutcome::Failed(err.to_string())
            }
        };

        LoadResult {
            generation: pending.generation,
            slug,
            outcome,
        }
    }

    /// Apply a settled lookup. Results from an earlier navigation are rejected.
    pub fn apply(&mut self, result: LoadResult) -> Result<(), StaleLoad> {
        if !self.mounted || result.generation != self.generation {
            tracing::debug!(
                stale = result.generation,
                current = self.generation,
                "Discarding stale page load"
            );
            return Err(StaleLoad {
                stale: result.generation,
                current: self.generation,
            });
        }

        match result.outcome {
            LoadOutcome::Found(article) => {
                self.deps
                    .store
                    .set_active(self.session, self.kind, Some(&article.item.slug));
                self.deps
                    .metadata
                    .set_metadata(self.session, link_preview(&article.item));
                self.article = Some(*article);
                self.render();
            }
            LoadOutcome::Missing => {
                let redirect = (self.kind == ContentKind::Howto)
                    .then(|| SearchRedirect::for_missing_howto(&result.slug));
                self.state = PageState::NotFound(NotFound {
                    slug: result.slug,
                    redirect,
                });
            }
            LoadOutcome::Failed(message) => {
                self.state = PageState::Failed { message };
            }
        }

        Ok(())
    }

    /// Navigate and wait for the lookup in one step.
    pub async fn open(&mut self, route: Route) -> &PageState {
        let pending = self.begin(route);
        let deps = self.deps.clone();
        let result = Self::load(&deps, pending).await;
        if let Err(stale) = self.apply(result) {
            tracing::warn!(error = %stale, "Page load was superseded");
        }
        &self.state
    }

    /// Release the session's active pointer and metadata. Runs once per mount.
    pub fn leave(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.generation += 1;
        self.deps.metadata.clear_metadata(self.session);
        self.deps.store.set_active(self.session, self.kind, None);

        tracing::debug!(kind = %self.kind, slug = %self.route.slug, "Page left");
    }

    pub(super) fn render(&mut self) {
        if let Some(article) = &self.article {
            let view = ArticleView::build(
                article,
                self.viewer.as_ref(),
                &self.route,
                &self.deps.permissions,
            );
            self.state = PageState::Found(Box::new(view));
        }
    }
}

impl Drop for ArticlePage {
    fn drop(&mut self) {
        self.leave();
    }
}

async fn fetch(
    deps: &PageDeps,
    kind: ContentKind,
    slug: &str,
) -> Result<Option<LoadedArticle>, StoreError> {
    let Some(item) = deps.store.find_by_slug(kind, slug).await? else {
        return Ok(None);
    };

    let comments = deps.store.list_comments(&item).await?;
    let counts = deps.store.counts(item.id).await?;

    let tags = deps.tags.all_tags_by_key().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Tag catalog unavailable, rendering without tags");
        HashMap::new()
    });

    let author = author_card(deps, &item.creator.username, item.creator.country.clone()).await;
    let mut contributors = Vec::with_capacity(item.collaborators.len());
    for username in &item.collaborators {
        contributors.push(author_card(deps, username, None).await);
    }

    Ok(Some(LoadedArticle {
        item,
        comments,
        tags,
        author,
        contributors,
        counts,
    }))
}

async fn author_card(deps: &PageDeps, username: &str, country: Option<String>) -> AuthorCard {
    let profile = match deps.users.find_by_username(username).await {
        Ok(profile) => profile,
        Err(err) => {
            tracing::warn!(username = %username, error = %err, "Author lookup failed");
            None
        }
    };

    AuthorCard {
        username: username.to_string(),
        country: country.or_else(|| profile.as_ref().and_then(|p| p.country.clone())),
        is_verified: profile.is_some_and(|p| p.verified),
    }
}

fn link_preview(item: &ContentItem) -> PageMetadata {
    let image_url = match item.kind {
        ContentKind::Howto => item.cover_image.as_ref().map(|m| m.url.clone()),
        ContentKind::Research => latest_update_image(item),
    };

    PageMetadata {
        title: Some(item.title.clone()),
        description: Some(item.description.clone()),
        image_url,
    }
}
