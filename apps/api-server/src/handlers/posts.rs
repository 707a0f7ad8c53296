//! Post and comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{NewPost, PostPatch};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateCommentRequest, CreatePostRequest, SearchQuery, UpdatePostRequest};

use super::mapping::{comment_response, post_detail_response, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_all().await?;
    let data: Vec<_> = posts.iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

/// GET /api/posts/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.search(&query.q).await?;
    let data: Vec<_> = posts.iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let detail = state.posts.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_detail_response(&detail))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let summary = state
        .posts
        .create(
            &identity.actor,
            NewPost {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                tags: req.tags,
                category_id: req.category,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(&summary))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let summary = state
        .posts
        .update(
            &identity.actor,
            path.into_inner(),
            PostPatch {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                tags: req.tags,
                category_id: req.category,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&summary))))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({}))))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let view = state
        .posts
        .add_comment(&identity.actor, path.into_inner(), &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(&view))))
}
