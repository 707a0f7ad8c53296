use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::domain::{
    Category, CategoryPatch, Comment, NewCategory, NewPost, Post, PostPatch, Role, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository, PostRepository};
use quill_core::services::{CategoryService, PostService};
use quill_core::{Actor, DomainError};
use quill_infra::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

struct Harness {
    categories: CategoryService,
    posts: PostService,
    category_repo: Arc<InMemoryCategoryRepository>,
    admin: Actor,
    reader: Actor,
}

async fn harness() -> Harness {
    let category_repo = Arc::new(InMemoryCategoryRepository::new());
    let post_repo = Arc::new(InMemoryPostRepository::new());
    let user_repo = Arc::new(InMemoryUserRepository::new());

    let admin = user_repo
        .save(User::new(
            "Admin".into(),
            "admin@example.com".into(),
            "x".into(),
            Role::Admin,
        ))
        .await
        .unwrap();
    let reader = user_repo
        .save(
            User::new(
                "Reader".into(),
                "reader@example.com".into(),
                "x".into(),
                Role::User,
            )
            .with_avatar(Some("https://img.example.com/r.png".into())),
        )
        .await
        .unwrap();

    Harness {
        categories: CategoryService::new(category_repo.clone(), post_repo.clone()),
        posts: PostService::new(post_repo, category_repo.clone(), user_repo),
        category_repo,
        admin: Actor::new(admin.id, admin.role),
        reader: Actor::new(reader.id, reader.role),
    }
}

impl Harness {
    async fn category(&self, name: &str) -> Uuid {
        self.categories
            .create(
                &self.admin,
                NewCategory {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn post(&self, category_id: Uuid, title: &str) -> Uuid {
        self.posts
            .create(
                &self.admin,
                NewPost {
                    title: title.to_string(),
                    content: "B".to_string(),
                    category_id: Some(category_id),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .post
            .id
    }

    async fn post_count(&self, category_id: Uuid) -> u64 {
        self.category_repo
            .find_by_id(category_id)
            .await
            .unwrap()
            .unwrap()
            .post_count
    }
}

#[tokio::test]
async fn test_category_lifecycle_walkthrough() {
    let h = harness().await;

    let tech = h.category("Tech").await;
    assert_eq!(h.post_count(tech).await, 0);

    let post = h.post(tech, "A").await;
    assert_eq!(h.post_count(tech).await, 1);

    h.posts.delete(&h.admin, post).await.unwrap();
    assert_eq!(h.post_count(tech).await, 0);

    h.categories.delete(&h.admin, tech).await.unwrap();
    assert!(matches!(
        h.categories.get_by_id(tech).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_create_post_populates_references() {
    let h = harness().await;
    let tech = h.category("Tech").await;

    let summary = h
        .posts
        .create(
            &h.admin,
            NewPost {
                title: "Hello".into(),
                content: "World".into(),
                category_id: Some(tech),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(summary.post.author_id, h.admin.user_id);
    assert_eq!(summary.author.unwrap().email, "admin@example.com");
    assert_eq!(summary.category.unwrap().slug, "tech");
}

#[tokio::test]
async fn test_create_post_in_missing_category() {
    let h = harness().await;
    let missing = Uuid::new_v4();

    let result = h
        .posts
        .create(
            &h.admin,
            NewPost {
                title: "A".into(),
                content: "B".into(),
                category_id: Some(missing),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "Category", id }) if id == missing
    ));
    assert!(h.posts.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_admins_create_posts() {
    let h = harness().await;
    let tech = h.category("Tech").await;

    let result = h
        .posts
        .create(
            &h.reader,
            NewPost {
                title: "A".into(),
                content: "B".into(),
                category_id: Some(tech),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    assert_eq!(h.post_count(tech).await, 0);
}

#[tokio::test]
async fn test_delete_category_with_posts_conflicts() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    h.post(tech, "A").await;

    let result = h.categories.delete(&h.admin, tech).await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));
    assert!(h.categories.get_by_id(tech).await.is_ok());
}

#[tokio::test]
async fn test_delete_category_blocked_by_referencing_post_even_when_count_drifted() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    h.post(tech, "A").await;

    // Simulate drift: the counter says zero but a post still references it.
    h.category_repo.decrement_post_count(tech).await.unwrap();
    assert_eq!(h.post_count(tech).await, 0);

    let result = h.categories.delete(&h.admin, tech).await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_post_delete_clamps_counter_at_zero() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    h.category_repo.decrement_post_count(tech).await.unwrap();
    h.posts.delete(&h.admin, post).await.unwrap();

    assert_eq!(h.post_count(tech).await, 0);
}

#[tokio::test]
async fn test_non_author_cannot_modify_post() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    let update = h
        .posts
        .update(
            &h.reader,
            post,
            PostPatch {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(update, Err(DomainError::Unauthorized("post"))));

    let delete = h.posts.delete(&h.reader, post).await;
    assert!(matches!(delete, Err(DomainError::Unauthorized("post"))));
    assert_eq!(h.post_count(tech).await, 1);
}

#[tokio::test]
async fn test_author_without_admin_role_can_edit_own_post() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    // An author who lost the admin role still owns the post.
    let demoted = Actor::new(h.admin.user_id, Role::User);
    let updated = h
        .posts
        .update(
            &demoted,
            post,
            PostPatch {
                title: Some("Edited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.post.title, "Edited");
}

#[tokio::test]
async fn test_moving_post_moves_the_count() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let life = h.category("Life").await;
    let post = h.post(tech, "A").await;

    h.posts
        .update(
            &h.admin,
            post,
            PostPatch {
                category_id: Some(life),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(h.post_count(tech).await, 0);
    assert_eq!(h.post_count(life).await, 1);
}

#[tokio::test]
async fn test_update_to_missing_category_changes_nothing() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    let result = h
        .posts
        .update(
            &h.admin,
            post,
            PostPatch {
                title: Some("Changed".into()),
                category_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    let detail = h.posts.get_by_id(post).await.unwrap();
    assert_eq!(detail.summary.post.title, "A");
    assert_eq!(h.post_count(tech).await, 1);
}

#[tokio::test]
async fn test_add_comment_appends_one_populated_entry() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    let view = h
        .posts
        .add_comment(&h.reader, post, "  Nice one  ")
        .await
        .unwrap();

    assert_eq!(view.comment.content, "Nice one");
    assert_eq!(view.comment.user_id, h.reader.user_id);
    let author = view.user.unwrap();
    assert_eq!(author.name, "Reader");
    assert_eq!(author.avatar.as_deref(), Some("https://img.example.com/r.png"));

    let detail = h.posts.get_by_id(post).await.unwrap();
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].comment.id, view.comment.id);
    assert_eq!(detail.comments[0].user.as_ref().unwrap().name, "Reader");
}

#[tokio::test]
async fn test_add_comment_to_missing_post() {
    let h = harness().await;
    let result = h.posts.add_comment(&h.reader, Uuid::new_v4(), "hi").await;
    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
}

#[tokio::test]
async fn test_get_by_id_counts_views() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    let post = h.post(tech, "A").await;

    assert_eq!(h.posts.get_by_id(post).await.unwrap().summary.post.view_count, 1);
    assert_eq!(h.posts.get_by_id(post).await.unwrap().summary.post.view_count, 2);
}

#[tokio::test]
async fn test_search_matches_title_content_and_tags() {
    let h = harness().await;
    let tech = h.category("Tech").await;

    let tagged = h
        .posts
        .create(
            &h.admin,
            NewPost {
                title: "Weekly notes".into(),
                content: "Nothing special".into(),
                tags: vec!["Tokio".into()],
                category_id: Some(tech),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .post
        .id;
    let titled = h.post(tech, "Learning RUST").await;

    let by_tag = h.posts.search("tokio").await.unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].post.id, tagged);

    let by_title = h.posts.search("rust").await.unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].post.id, titled);

    let by_content = h.posts.search("SPECIAL").await.unwrap();
    assert_eq!(by_content.len(), 1);

    assert!(h.posts.search("absent-term").await.unwrap().is_empty());
    assert!(matches!(
        h.posts.search("   ").await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_duplicate_category_name_rejected() {
    let h = harness().await;
    h.category("Tech").await;

    let result = h
        .categories
        .create(
            &h.admin,
            NewCategory {
                name: "tech".into(),
                description: None,
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Duplicate(_))));
}

#[tokio::test]
async fn test_category_update_keeps_counter() {
    let h = harness().await;
    let tech = h.category("Tech").await;
    h.post(tech, "A").await;

    let updated = h
        .categories
        .update(
            &h.admin,
            tech,
            CategoryPatch {
                name: Some("Technology".into()),
                description: Some("Gadgets".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "technology");
    assert_eq!(updated.post_count, 1);
}

#[tokio::test]
async fn test_category_writes_require_admin() {
    let h = harness().await;
    let tech = h.category("Tech").await;

    let create = h
        .categories
        .create(
            &h.reader,
            NewCategory {
                name: "Mine".into(),
                description: None,
            },
        )
        .await;
    assert!(matches!(create, Err(DomainError::Forbidden { .. })));

    let delete = h.categories.delete(&h.reader, tech).await;
    assert!(matches!(delete, Err(DomainError::Forbidden { .. })));
}

/// Category store that lets one counter increment land right after the next read.
struct IncrementAfterRead {
    inner: Arc<InMemoryCategoryRepository>,
    armed: AtomicBool,
}

#[async_trait]
impl BaseRepository<Category, Uuid> for IncrementAfterRead {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let found = self.inner.find_by_id(id).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.inner.increment_post_count(id).await?;
        }
        Ok(found)
    }

    async fn save(&self, entity: Category) -> Result<Category, RepoError> {
        self.inner.save(entity).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl CategoryRepository for IncrementAfterRead {
    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        CategoryRepository::list_all(self.inner.as_ref()).await
    }

    async fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError> {
        self.inner.find_by_name_or_slug(name, slug).await
    }

    async fn update_details(&self, category: &Category) -> Result<Category, RepoError> {
        self.inner.update_details(category).await
    }

    async fn increment_post_count(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.increment_post_count(id).await
    }

    async fn decrement_post_count(&self, id: Uuid) -> Result<bool, RepoError> {
        self.inner.decrement_post_count(id).await
    }
}

/// Post store that lets one comment and one view land right after the next read.
struct ActivityAfterRead {
    inner: Arc<InMemoryPostRepository>,
    pending: std::sync::Mutex<Option<Comment>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for ActivityAfterRead {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let found = self.inner.find_by_id(id).await?;
        let pending = self.pending.lock().unwrap().take();
        if let Some(comment) = pending {
            self.inner.push_comment(id, comment).await?;
            self.inner.increment_view_count(id).await?;
        }
        Ok(found)
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.inner.save(entity).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl PostRepository for ActivityAfterRead {
    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        PostRepository::list_all(self.inner.as_ref()).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        self.inner.search(query).await
    }

    async fn count_by_category(&self, category_id: Uuid) -> Result<u64, RepoError> {
        self.inner.count_by_category(category_id).await
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        self.inner.update_content(post).await
    }

    async fn push_comment(&self, post_id: Uuid, comment: Comment) -> Result<(), RepoError> {
        self.inner.push_comment(post_id, comment).await
    }

    async fn increment_view_count(&self, post_id: Uuid) -> Result<(), RepoError> {
        self.inner.increment_view_count(post_id).await
    }
}

#[tokio::test]
async fn test_category_edit_does_not_overwrite_concurrent_increment() {
    let h = harness().await;
    let tech = h.category("Tech").await;

    let racing = Arc::new(IncrementAfterRead {
        inner: h.category_repo.clone(),
        armed: AtomicBool::new(true),
    });
    let service = CategoryService::new(racing, Arc::new(InMemoryPostRepository::new()));

    let updated = service
        .update(
            &h.admin,
            tech,
            CategoryPatch {
                name: None,
                description: Some("Gadgets".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.post_count, 1);
    assert_eq!(h.post_count(tech).await, 1);
}

#[tokio::test]
async fn test_post_edit_does_not_drop_concurrent_comment() {
    let category_repo = Arc::new(InMemoryCategoryRepository::new());
    let post_repo = Arc::new(InMemoryPostRepository::new());
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let admin = Actor::new(Uuid::new_v4(), Role::Admin);

    let tech = CategoryService::new(category_repo.clone(), post_repo.clone())
        .create(
            &admin,
            NewCategory {
                name: "Tech".into(),
                description: None,
            },
        )
        .await
        .unwrap();
    let created = PostService::new(post_repo.clone(), category_repo.clone(), user_repo.clone())
        .create(
            &admin,
            NewPost {
                title: "A".into(),
                content: "B".into(),
                category_id: Some(tech.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let comment = Comment::new(Uuid::new_v4(), "Landed mid-edit").unwrap();
    let racing = Arc::new(ActivityAfterRead {
        inner: post_repo.clone(),
        pending: std::sync::Mutex::new(Some(comment.clone())),
    });
    let service = PostService::new(racing, category_repo, user_repo);

    let updated = service
        .update(
            &admin,
            created.post.id,
            PostPatch {
                title: Some("Edited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.post.title, "Edited");
    assert_eq!(updated.post.comments, vec![comment]);
    assert_eq!(updated.post.view_count, 1);

    let stored = post_repo.find_by_id(created.post.id).await.unwrap().unwrap();
    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.view_count, 1);
}
