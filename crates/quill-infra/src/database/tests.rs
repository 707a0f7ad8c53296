use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use crate::database::entity::{category, post};
use crate::database::postgres_repo::{PostgresCategoryRepository, PostgresPostRepository};
use quill_core::domain::{Category, Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository, PostRepository};

fn post_model(id: Uuid, comments: serde_json::Value) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        excerpt: "Content".to_owned(),
        tags: serde_json::json!(["rust", "web"]),
        category_id: Uuid::new_v4(),
        author_id: Uuid::new_v4(),
        view_count: 3,
        comments,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_decodes_embedded_documents() {
    let post_id = Uuid::new_v4();
    let comment = Comment::new(Uuid::new_v4(), "Great read").unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            post_id,
            serde_json::json!([comment.clone()]),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.view_count, 3);
    assert_eq!(post.comments, vec![comment]);
}

#[tokio::test]
async fn test_malformed_comments_surface_as_query_error() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            post_id,
            serde_json::json!({"not": "an array"}),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result: Result<Option<Post>, RepoError> = repo.find_by_id(post_id).await;
    assert!(matches!(result, Err(RepoError::Query(msg)) if msg.contains("posts.comments")));
}

#[tokio::test]
async fn test_update_content_leaves_comments_and_views_alone() {
    let post_id = Uuid::new_v4();
    let comment = Comment::new(Uuid::new_v4(), "Kept").unwrap();
    let stored = post_model(post_id, serde_json::json!([comment.clone()]));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![stored.clone()]])
        .into_connection();
    let repo = PostgresPostRepository::new(db.clone());

    let mut edited: Post = stored.try_into().unwrap();
    edited.comments.clear();
    edited.view_count = 0;
    edited.title = "Edited".to_owned();

    let updated = repo.update_content(&edited).await.unwrap();
    assert_eq!(updated.comments, vec![comment]);
    assert_eq!(updated.view_count, 3);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("UPDATE"));
    assert!(!log.contains("\"comments\" ="));
    assert!(!log.contains("\"view_count\" ="));
}

#[tokio::test]
async fn test_update_details_leaves_post_count_alone() {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let stored = category::Model {
        id,
        name: "Technology".to_owned(),
        slug: "technology".to_owned(),
        description: None,
        post_count: 4,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![stored.clone()]])
        .into_connection();
    let repo = PostgresCategoryRepository::new(db.clone());

    let mut edited: Category = stored.try_into().unwrap();
    edited.post_count = 0;

    let updated = repo.update_details(&edited).await.unwrap();
    assert_eq!(updated.post_count, 4);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(!log.contains("\"post_count\" ="));
}

#[tokio::test]
async fn test_update_details_on_missing_category() {
    let now = chrono::Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<category::Model>::new()])
        .into_connection();
    let repo = PostgresCategoryRepository::new(db);

    let missing = Category {
        id: Uuid::new_v4(),
        name: "Ghost".to_owned(),
        slug: "ghost".to_owned(),
        description: None,
        post_count: 0,
        created_at: now,
        updated_at: now,
    };
    let result = repo.update_details(&missing).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_increment_missing_category_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);
    let result = repo.increment_post_count(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_decrement_at_zero_reports_clamp() {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results(vec![vec![category::Model {
            id,
            name: "Tech".to_owned(),
            slug: "tech".to_owned(),
            description: None,
            post_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);
    assert!(!repo.decrement_post_count(id).await.unwrap());
}

#[tokio::test]
async fn test_push_comment_to_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let comment = Comment::new(Uuid::new_v4(), "hello").unwrap();
    let result = repo.push_comment(Uuid::new_v4(), comment).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}
