use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::views::{AuthorRef, CategoryRef, CommentAuthor, CommentView, PostDetail, PostSummary};
use crate::authz::{Actor, authorize, ensure_owner_or_admin};
use crate::domain::{Category, Comment, NewPost, Post, PostPatch, Role, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository, UserRepository};

/// Post operations, including the category `post_count` bookkeeping.
///
/// Each counter adjustment is a single atomic store operation, but the post
/// write and the counter write are two separate steps with no transaction
/// around them. A failure between the two leaves the counter off by one.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<PostSummary>, DomainError> {
        let posts = self.posts.list_all().await?;
        self.summarize(posts).await
    }

    /// Fetch one post with comments populated, counting the view.
    pub async fn get_by_id(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let mut post = self.find_post(id).await?;

        self.posts.increment_view_count(id).await?;
        post.view_count += 1;

        let mut user_ids: Vec<Uuid> = post.comments.iter().map(|c| c.user_id).collect();
        user_ids.push(post.author_id);
        let users = self.users_by_id(&user_ids).await?;

        let category = self.categories.find_by_id(post.category_id).await?;
        let comments = post
            .comments
            .iter()
            .map(|comment| CommentView {
                comment: comment.clone(),
                user: users.get(&comment.user_id).map(CommentAuthor::from),
            })
            .collect();

        Ok(PostDetail {
            summary: PostSummary {
                author: users.get(&post.author_id).map(AuthorRef::from),
                category: category.as_ref().map(CategoryRef::from),
                post,
            },
            comments,
        })
    }

    /// Create a post authored by the caller and count it against its category.
    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<PostSummary, DomainError> {
        authorize(actor, Role::Admin)?;

        let post = Post::new(actor.user_id, input)?;
        let category = self.require_category(post.category_id).await?;

        let saved = self.posts.save(post).await?;
        self.categories.increment_post_count(category.id).await?;

        tracing::info!(
            post_id = %saved.id,
            category_id = %category.id,
            author_id = %actor.user_id,
            "Post created"
        );
        self.summarize_one(saved).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<PostSummary, DomainError> {
        let mut post = self.find_post(id).await?;
        ensure_owner_or_admin(actor, post.author_id, "post")?;

        let previous_category = post.category_id;
        let moved_to = patch.category_id.filter(|c| *c != previous_category);
        if let Some(target) = moved_to {
            self.require_category(target).await?;
        }

        post.apply(patch)?;
        let saved = match self.posts.update_content(&post).await {
            Ok(saved) => saved,
            Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", id)),
            Err(e) => return Err(e.into()),
        };

        if let Some(target) = moved_to {
            self.decrement_clamped(previous_category).await?;
            self.categories.increment_post_count(target).await?;
            tracing::info!(
                post_id = %id,
                from = %previous_category,
                to = %target,
                "Post moved to another category"
            );
        }

        tracing::info!(post_id = %id, editor_id = %actor.user_id, "Post updated");
        self.summarize_one(saved).await
    }

    /// Delete a post and release its slot in the category counter.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        let post = self.find_post(id).await?;
        ensure_owner_or_admin(actor, post.author_id, "post")?;

        self.posts.delete(id).await?;
        self.decrement_clamped(post.category_id).await?;

        tracing::info!(post_id = %id, editor_id = %actor.user_id, "Post deleted");
        Ok(())
    }

    /// Case-insensitive substring search over title, content and tags.
    pub async fn search(&self, query: &str) -> Result<Vec<PostSummary>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::invalid("q", "Search query is required"));
        }

        let posts = self.posts.search(query).await?;
        tracing::debug!(query = %query, hits = posts.len(), "Post search");
        self.summarize(posts).await
    }

    /// Append a comment by the caller and return it with author fields.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let comment = Comment::new(actor.user_id, content)?;

        match self.posts.push_comment(post_id, comment.clone()).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", post_id)),
            Err(e) => return Err(e.into()),
        }

        let user = self.users.find_by_id(actor.user_id).await?;
        tracing::info!(post_id = %post_id, comment_id = %comment.id, "Comment added");

        Ok(CommentView {
            user: user.as_ref().map(CommentAuthor::from),
            comment,
        })
    }

    async fn find_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn require_category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// The clamp hides drift instead of surfacing it, so it is logged.
    async fn decrement_clamped(&self, category_id: Uuid) -> Result<(), DomainError> {
        match self.categories.decrement_post_count(category_id).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!(
                    category_id = %category_id,
                    "Category post count already zero; counter has drifted"
                );
                Ok(())
            }
            Err(RepoError::NotFound) => {
                tracing::warn!(
                    category_id = %category_id,
                    "Post referenced a missing category"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn users_by_id(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, User>, DomainError> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let users = self.users.find_by_ids(&unique).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn summarize_one(&self, post: Post) -> Result<PostSummary, DomainError> {
        let mut summaries = self.summarize(vec![post]).await?;
        summaries
            .pop()
            .ok_or_else(|| DomainError::Internal("post summary missing".to_string()))
    }

    async fn summarize(&self, posts: Vec<Post>) -> Result<Vec<PostSummary>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let users = self.users_by_id(&author_ids).await?;
        let categories: HashMap<Uuid, Category> = self
            .categories
            .list_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| PostSummary {
                author: users.get(&post.author_id).map(AuthorRef::from),
                category: categories.get(&post.category_id).map(CategoryRef::from),
                post,
            })
            .collect())
    }
}
