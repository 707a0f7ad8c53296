use std::sync::Arc;

use uuid::Uuid;

use crate::authz::{Actor, authorize};
use crate::domain::{Category, CategoryPatch, NewCategory, Role};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository};

/// Category operations. Reads are public; writes require the admin role.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { categories, posts }
    }

    pub async fn list_all(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list_all().await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub async fn create(&self, actor: &Actor, input: NewCategory) -> Result<Category, DomainError> {
        authorize(actor, Role::Admin)?;

        let category = Category::new(input)?;
        self.ensure_unique(&category).await?;

        let saved = self.categories.save(category).await?;
        tracing::info!(category_id = %saved.id, slug = %saved.slug, "Category created");
        Ok(saved)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: CategoryPatch,
    ) -> Result<Category, DomainError> {
        authorize(actor, Role::Admin)?;

        let mut category = self.get_by_id(id).await?;
        let previous_slug = category.slug.clone();
        let previous_name = category.name.clone();
        category.apply(patch)?;

        if category.name != previous_name || category.slug != previous_slug {
            self.ensure_unique(&category).await?;
        }

        let saved = match self.categories.update_details(&category).await {
            Ok(saved) => saved,
            Err(RepoError::NotFound) => return Err(DomainError::not_found("Category", id)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(category_id = %saved.id, "Category updated");
        Ok(saved)
    }

    /// Remove a category. Blocked while any post still references it.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        authorize(actor, Role::Admin)?;

        let category = self.get_by_id(id).await?;
        let referencing = self.posts.count_by_category(id).await?;

        if category.post_count > 0 || referencing > 0 {
            tracing::debug!(
                category_id = %id,
                post_count = category.post_count,
                referencing,
                "Refusing to delete category with posts"
            );
            return Err(DomainError::Conflict(
                "Cannot delete category with existing posts".to_string(),
            ));
        }

        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn ensure_unique(&self, category: &Category) -> Result<(), DomainError> {
        let existing = self
            .categories
            .find_by_name_or_slug(&category.name, &category.slug)
            .await?;

        match existing {
            Some(other) if other.id != category.id => Err(DomainError::Duplicate(format!(
                "Category '{}' already exists",
                category.name
            ))),
            _ => Ok(()),
        }
    }
}
