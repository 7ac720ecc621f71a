//! Ports - trait definitions for external collaborators.
//! These are the "interfaces" that infrastructure must implement.

mod analytics;
mod auth;
mod authorization;
mod content_store;
mod metadata;
mod repository;
mod tags;

pub use analytics::{AnalyticsEvent, AnalyticsSink};
pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use authorization::{AuthorizationPolicy, Intent};
pub use content_store::{
    ChangedField, ContentStore, EngagementCounts, ItemChange, MemberChange, SessionId,
};
pub use metadata::{MetadataSink, PageMetadata};
pub use repository::{BaseRepository, UserRepository};
pub use tags::TagCatalog;
