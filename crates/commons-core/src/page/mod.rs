//! Article page controller for how-to and research pages.
//!
//! A page is mounted on a [`Route`], resolves its item through the
//! [`ContentStore`](crate::ports::ContentStore), and exposes a render-ready
//! [`PageState`]. Leaving the page (explicitly, by navigating elsewhere, or by
//! dropping it) releases the session's active pointer and metadata exactly once.

mod actions;
mod controller;
mod subscription;
mod view;

pub use actions::{ActionOutcome, ActionTicket, Notice, PageAction};
pub use controller::{ArticlePage, LoadResult, PageDeps, PendingLoad, Route, StaleLoad};
pub use subscription::PageSubscription;
pub use view::{ArticleView, AuthorCard, NotFound, PageState, SearchRedirect, UpdateView};
