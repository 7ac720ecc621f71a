//! Link-preview metadata kept per mounted page.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use commons_core::ports::{MetadataSink, PageMetadata, SessionId};

#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: Mutex<HashMap<SessionId, PageMetadata>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata currently published for `session`.
    pub fn current(&self, session: SessionId) -> Option<PageMetadata> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataSink for InMemoryMetadataStore {
    fn set_metadata(&self, session: SessionId, metadata: PageMetadata) {
        tracing::trace!(?session, title = ?metadata.title, "Page metadata set");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session, metadata);
    }

    fn clear_metadata(&self, session: SessionId) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session);
    }
}
