//! Domain entities - the core business objects.

mod category;
mod post;
mod slug;
mod user;

use uuid::Uuid;

pub use category::{Category, CategoryPatch, NewCategory};
pub use post::{Comment, NewPost, Post, PostPatch};
pub use slug::slugify;
pub use user::{Role, User, validate_registration};

/// Entities addressable by a UUID primary key.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}
