//! Render-only derivations over store snapshots.

mod comments;
mod tags;
mod updates;

pub use comments::to_user_comments;
pub use tags::derive_tag_list;
pub use updates::{
    latest_update_image, public_update_count, public_updates, scroll_target,
    should_expand_comments, update_anchor,
};
