use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::update::Update;
use crate::error::DomainError;

/// The two article flavours served by the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    #[serde(rename = "how-to")]
    Howto,
    Research,
}

impl ContentKind {
    /// Prefix used for analytics actions and categories.
    pub fn event_prefix(self) -> &'static str {
        match self {
            ContentKind::Howto => "Howto",
            ContentKind::Research => "Research",
        }
    }

    pub fn route_segment(self) -> &'static str {
        match self {
            ContentKind::Howto => "how-to",
            ContentKind::Research => "research",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}

/// Moderation workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModerationStatus {
    Draft,
    AwaitingModeration,
    Accepted,
    Rejected,
}

impl ModerationStatus {
    /// Apply a moderator decision. Only items awaiting moderation can be decided.
    pub fn decide(self, accepted: bool) -> Result<ModerationStatus, DomainError> {
        match self {
            ModerationStatus::AwaitingModeration if accepted => Ok(ModerationStatus::Accepted),
            ModerationStatus::AwaitingModeration => Ok(ModerationStatus::Rejected),
            other => Err(DomainError::Validation(format!(
                "cannot moderate an item in state {other:?}"
            ))),
        }
    }
}

/// Identity of the member who created an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// An uploaded file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single how-to step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub images: Vec<Media>,
}

/// A how-to or research article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub creator: Creator,
    pub moderation: ModerationStatus,
    #[serde(default, deserialize_with = "collaborator_list")]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub subscribers: BTreeSet<String>,
    #[serde(default)]
    pub useful_votes: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub cover_image: Option<Media>,
    #[serde(default)]
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create a new item owned by `creator`, awaiting moderation.
    pub fn new(kind: ContentKind, slug: impl Into<String>, title: impl Into<String>, creator: Creator) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            creator,
            moderation: ModerationStatus::AwaitingModeration,
            collaborators: Vec::new(),
            updates: Vec::new(),
            subscribers: BTreeSet::new(),
            useful_votes: BTreeSet::new(),
            tags: BTreeSet::new(),
            cover_image: None,
            steps: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Whether `username` or `user_id` identifies the creator.
    pub fn is_created_by(&self, user_id: Uuid, username: Option<&str>) -> bool {
        self.creator.id == user_id || username.is_some_and(|name| name == self.creator.username)
    }

    pub fn is_collaborator(&self, username: &str) -> bool {
        self.collaborators.iter().any(|c| c == username)
    }

    pub fn has_voted_useful(&self, username: &str) -> bool {
        self.useful_votes.contains(username)
    }

    pub fn is_subscribed(&self, username: &str) -> bool {
        self.subscribers.contains(username)
    }
}

/// Collaborators are stored either as a list or as a comma-separated string.
fn collaborator_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let names = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::List(list)) => list,
        Some(Raw::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
