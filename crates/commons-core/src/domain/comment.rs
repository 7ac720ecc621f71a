use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment left on an item or an update.
///
/// `creator_id` holds whichever identity the writer recorded, a user id or a
/// username, so both forms must be accepted when matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub creator_id: String,
    #[serde(default)]
    pub creator_name: String,
    #[serde(default)]
    pub creator_country: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(creator_id: impl Into<String>, creator_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id: creator_id.into(),
            creator_name: creator_name.into(),
            creator_country: None,
            text: text.into(),
            created_at: Utc::now(),
            modified_at: None,
        }
    }
}

/// Comment annotated for display. Derived at render time and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub is_editable: bool,
}
