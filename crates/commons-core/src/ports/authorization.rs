//! Authorization policy port.

use crate::domain::{ContentItem, User};

/// What the acting user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Edit,
    Delete,
    Moderate,
}

/// Platform authorization rules beyond plain ownership.
pub trait AuthorizationPolicy: Send + Sync {
    /// Whether `user` holds elevated access for `intent` on `item`.
    fn grants(&self, intent: Intent, item: Option<&ContentItem>, user: &User) -> bool;
}
