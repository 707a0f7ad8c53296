//! Category handlers. Reads are public; writes are admin-only.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{CategoryPatch, NewCategory};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateCategoryRequest, UpdateCategoryRequest};

use super::mapping::category_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list_all().await?;
    let data: Vec<_> = categories.iter().map(category_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::list(data)))
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category_response(&category))))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .create(
            &identity.actor,
            NewCategory {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(category_response(&category))))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .update(
            &identity.actor,
            path.into_inner(),
            CategoryPatch {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(category_response(&category))))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .categories
        .delete(&identity.actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({}))))
}
