use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (lowercased) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Load every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;

    /// Find a category whose name or slug collides with the given values.
    async fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError>;

    /// Write the editable fields (`name`, `slug`, `description`,
    /// `updated_at`) of an existing category and return the stored record.
    ///
    /// `post_count` is left to the counter operations. Returns
    /// `RepoError::NotFound` if the category does not exist.
    async fn update_details(&self, category: &Category) -> Result<Category, RepoError>;

    /// Add one to `post_count` in a single store operation.
    ///
    /// Returns `RepoError::NotFound` if the category does not exist.
    async fn increment_post_count(&self, id: Uuid) -> Result<(), RepoError>;

    /// Subtract one from `post_count` in a single store operation, never
    /// going below zero. Returns `true` if the count was decremented and
    /// `false` if it was already zero.
    async fn decrement_post_count(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, newest first.
    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts whose title, content or tags contain `query`, case-insensitively.
    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError>;

    /// Number of posts referencing a category.
    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError>;

    /// Write the editable fields (`title`, `content`, `excerpt`, `tags`,
    /// `category_id`, `updated_at`) of an existing post and return the
    /// stored record.
    ///
    /// Comments and the view count are never written here. Returns
    /// `RepoError::NotFound` if the post does not exist.
    async fn update_content(&self, post: &Post) -> Result<Post, RepoError>;

    /// Append a comment to the post's comment sequence.
    ///
    /// Returns `RepoError::NotFound` if the post does not exist.
    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<(), RepoError>;

    /// Add one to the post's view count.
    async fn increment_view_count(&self, post_id: Uuid) -> Result<(), RepoError>;
}
