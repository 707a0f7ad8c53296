//! Read models returned by the post service, with referenced entities
//! resolved to the display fields clients need.

use crate::domain::{Category, Comment, Post, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: uuid::Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    pub id: uuid::Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&User> for CommentAuthor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// A post with its author and category populated.
///
/// Either reference is `None` when the referenced record no longer exists.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author: Option<AuthorRef>,
    pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub user: Option<CommentAuthor>,
}

/// A single post with its comments' authors populated as well.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub comments: Vec<CommentView>,
}
