//! # Commons Core
//!
//! The domain layer of the community article pages.
//! This crate holds the entities, the ports to external collaborators, the
//! render-only derivations and the page controller. It has no storage or
//! transport dependencies.

pub mod domain;
pub mod error;
pub mod page;
pub mod permissions;
pub mod ports;
pub mod signup;
pub mod view;

pub use error::{DomainError, StoreError};
pub use permissions::{PermissionPredicate, PlatformPolicy};
