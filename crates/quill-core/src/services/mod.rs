//! Application services - the operations exposed over HTTP.
//!
//! Services own the cross-record rules: guards run first, then store
//! reads/writes, then the denormalized category counter is adjusted.

mod category;
mod post;
mod views;

pub use category::CategoryService;
pub use post::PostService;
pub use views::{AuthorRef, CategoryRef, CommentAuthor, CommentView, PostDetail, PostSummary};
