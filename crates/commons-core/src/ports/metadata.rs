//! Link-preview metadata port.

use serde::Serialize;

use super::SessionId;

/// Title, description and image used for link previews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Sink for page metadata, scoped per mounted page.
pub trait MetadataSink: Send + Sync {
    fn set_metadata(&self, session: SessionId, metadata: PageMetadata);

    fn clear_metadata(&self, session: SessionId);
}
