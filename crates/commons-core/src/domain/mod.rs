//! Domain entities - the core business objects.

mod comment;
mod content;
mod tag;
mod update;
mod user;

pub use comment::{Comment, UserComment};
pub use content::{ContentItem, ContentKind, Creator, Media, ModerationStatus, Step};
pub use tag::Tag;
pub use update::{Update, UpdateStatus};
pub use user::{User, UserRole};
