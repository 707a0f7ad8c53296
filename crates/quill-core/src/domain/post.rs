use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identifiable;
use crate::error::{DomainError, FieldError};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const EXCERPT_LEN: usize = 150;

/// Comment - an append-only remark embedded in exactly one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, content: &str) -> Result<Self, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::invalid("content", "Comment content is required"));
        }
        if content.chars().count() > MAX_COMMENT_LEN {
            return Err(DomainError::invalid(
                "content",
                format!("Comment cannot exceed {} characters", MAX_COMMENT_LEN),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            content: content.to_string(),
            user_id,
            created_at: Utc::now(),
        })
    }
}

/// Post entity - an article owned by an author and filed under one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub view_count: u64,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
}

impl Post {
    /// Build a validated post authored by `author_id`.
    pub fn new(author_id: Uuid, input: NewPost) -> Result<Self, DomainError> {
        let title = input.title.trim().to_string();
        let content = input.content.trim().to_string();

        let mut errors = validate(&title, &content);
        if input.category_id.is_none() {
            errors.push(FieldError::new("category", "Category is required"));
        }
        let category_id = match input.category_id {
            Some(id) if errors.is_empty() => id,
            _ => return Err(DomainError::Validation(errors)),
        };

        let excerpt = resolve_excerpt(input.excerpt, &content);
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            content,
            excerpt,
            tags: normalize_tags(input.tags),
            category_id,
            author_id,
            view_count: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch with validation re-run. The post is unchanged on error.
    pub fn apply(&mut self, patch: PostPatch) -> Result<(), DomainError> {
        let title = patch
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| self.title.clone());
        let content = patch
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| self.content.clone());

        let errors = validate(&title, &content);
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        // A derived excerpt follows the content; an explicit one is kept.
        match patch.excerpt {
            Some(excerpt) => self.excerpt = resolve_excerpt(Some(excerpt), &content),
            None if content != self.content && self.excerpt == derive_excerpt(&self.content) => {
                self.excerpt = derive_excerpt(&content);
            }
            None => {}
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        self.title = title;
        self.content = content;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Case-insensitive substring match against title, content and tags.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

impl Identifiable for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn validate(title: &str, content: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(FieldError::new(
            "title",
            format!("Title cannot exceed {} characters", MAX_TITLE_LEN),
        ));
    }
    if content.is_empty() {
        errors.push(FieldError::new("content", "Content is required"));
    }
    errors
}

fn resolve_excerpt(excerpt: Option<String>, content: &str) -> String {
    match excerpt.map(|e| e.trim().to_string()) {
        Some(e) if !e.is_empty() => e,
        _ => derive_excerpt(content),
    }
}

/// First `EXCERPT_LEN` characters of the content, with `...` when cut.
pub(crate) fn derive_excerpt(content: &str) -> String {
    let content = content.trim();
    match content.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", content[..cut].trim_end()),
        None => content.to_string(),
    }
}

/// Trim tags, drop empty ones and remove case-insensitive duplicates.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}
