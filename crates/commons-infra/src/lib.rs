//! # Commons Infrastructure
//!
//! Concrete implementations of the ports defined in `commons-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory adapters only
//! - `auth` - JWT + Argon2 authentication

pub mod analytics;
pub mod metadata;
pub mod seed;
pub mod store;
pub mod tags;
pub mod users;

#[cfg(feature = "auth")]
pub mod auth;

pub use analytics::{RecordingAnalytics, TracingAnalytics};
pub use metadata::InMemoryMetadataStore;
pub use seed::{SeedData, SeedError, SeedSummary};
pub use store::InMemoryContentStore;
pub use tags::InMemoryTagCatalog;
pub use users::InMemoryUserRepository;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
