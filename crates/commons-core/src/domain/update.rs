use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;
use super::content::Media;

/// Publication state of a research update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Draft,
    Published,
}

/// A dated entry on a research item's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: UpdateStatus,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub images: Vec<Media>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Update {
    pub fn new(title: impl Into<String>, status: UpdateStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status,
            deleted: false,
            images: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Published and not soft-deleted.
    pub fn is_public(&self) -> bool {
        self.status == UpdateStatus::Published && !self.deleted
    }
}
