//! Seed data for the in-memory stores.
//!
//! A seed document is JSON with four optional arrays:
//!
//! ```json
//! {
//!   "users": [{ "username": "jack", "display_name": "Jack", "email": "jack@example.com",
//!               "password": "hunter22", "verified": true, "roles": ["admin"] }],
//!   "items": [{ "...": "full ContentItem" }],
//!   "comments": [{ "kind": "how-to", "slug": "oven", "comments": [] }],
//!   "tags": [{ "key": "t1", "label": "plastic" }]
//! }
//! ```

use serde::Deserialize;

use commons_core::domain::{Comment, ContentItem, ContentKind, Tag, User, UserRole};
use commons_core::error::StoreError;
use commons_core::ports::{BaseRepository, ContentStore, PasswordService};

use crate::store::InMemoryContentStore;
use crate::tags::InMemoryTagCatalog;
use crate::users::InMemoryUserRepository;

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub comments: Vec<SeedComments>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A profile with an optional plain-text password, hashed on load.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Item-level comments for the item with `slug`.
#[derive(Debug, Deserialize)]
pub struct SeedComments {
    pub kind: ContentKind,
    pub slug: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub items: usize,
    pub comments: usize,
    pub tags: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed rejected by store: {0}")]
    Store(#[from] StoreError),

    #[error("could not hash password for '{username}': {reason}")]
    Password { username: String, reason: String },

    #[error("comments reference unknown {kind} '{slug}'")]
    UnknownItem { kind: ContentKind, slug: String },
}

impl SeedData {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Insert everything into the given stores.
    pub async fn load_into(
        self,
        content: &InMemoryContentStore,
        users: &InMemoryUserRepository,
        tags: &InMemoryTagCatalog,
        passwords: &dyn PasswordService,
    ) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for seed in self.users {
            let password_hash = match &seed.password {
                Some(plain) => passwords.hash(plain).map_err(|e| SeedError::Password {
                    username: seed.username.clone(),
                    reason: e.to_string(),
                })?,
                None => String::new(),
            };
            let display_name = seed.display_name.unwrap_or_else(|| seed.username.clone());
            let mut user = User::new(seed.username, display_name, seed.email, password_hash)
                .with_roles(seed.roles);
            user.verified = seed.verified;
            user.country = seed.country;

            users.save(user).await?;
            summary.users += 1;
        }

        for tag in self.tags {
            tags.insert(tag).await;
            summary.tags += 1;
        }

        for item in self.items {
            content.insert(item).await?;
            summary.items += 1;
        }

        for batch in self.comments {
            let item = content
                .find_by_slug(batch.kind, &batch.slug)
                .await?
                .ok_or_else(|| SeedError::UnknownItem {
                    kind: batch.kind,
                    slug: batch.slug.clone(),
                })?;
            for comment in batch.comments {
                content.add_comment(item.id, comment).await?;
                summary.comments += 1;
            }
        }

        tracing::info!(
            users = summary.users,
            items = summary.items,
            comments = summary.comments,
            tags = summary.tags,
            "Seed data loaded"
        );

        Ok(summary)
    }
}
