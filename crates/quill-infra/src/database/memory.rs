//! In-memory stores - used when no database is configured, and in tests.
//!
//! Every operation takes the store's async lock once, so counter and
//! comment updates are atomic with respect to each other.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Identifiable, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository, PostRepository, UserRepository};

/// Generic in-memory repository keyed by entity id.
pub struct InMemoryBaseRepository<T> {
    store: RwLock<HashMap<Uuid, T>>,
}

impl<T> InMemoryBaseRepository<T> {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for InMemoryBaseRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory user repository.
pub type InMemoryUserRepository = InMemoryBaseRepository<User>;

/// In-memory category repository.
pub type InMemoryCategoryRepository = InMemoryBaseRepository<Category>;

/// In-memory post repository.
pub type InMemoryPostRepository = InMemoryBaseRepository<Post>;

#[async_trait]
impl<T> BaseRepository<T, Uuid> for InMemoryBaseRepository<T>
where
    T: Identifiable + Clone + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut store = self.store.write().await;
        store.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.trim().to_lowercase();
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let store = self.store.read().await;
        let mut categories: Vec<Category> = store.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name) || c.slug == slug)
            .cloned())
    }

    async fn update_details(&self, category: &Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(&category.id).ok_or(RepoError::NotFound)?;
        stored.name = category.name.clone();
        stored.slug = category.slug.clone();
        stored.description = category.description.clone();
        stored.updated_at = category.updated_at;
        Ok(stored.clone())
    }

    async fn increment_post_count(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let category = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.post_count += 1;
        Ok(())
    }

    async fn decrement_post_count(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let category = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        if category.post_count == 0 {
            return Ok(false);
        }
        category.post_count -= 1;
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let needle = query.to_lowercase();
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.matches(&needle))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.excerpt = post.excerpt.clone();
        stored.tags = post.tags.clone();
        stored.category_id = post.category_id;
        stored.updated_at = post.updated_at;
        Ok(stored.clone())
    }

    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.comments.push(comment);
        Ok(())
    }

    async fn increment_view_count(&self, post_id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.view_count += 1;
        Ok(())
    }
}
