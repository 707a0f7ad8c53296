//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::domain::{User, validate_registration};
use quill_core::ports::{AuthError, BaseRepository};
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use super::mapping::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn issue_session(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.role)?;

    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req.name, &req.email, &req.password)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(DomainError::Duplicate("User already exists".to_string()).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let role = state.role_for(&req.email);
    let user = User::new(req.name.trim().to_string(), req.email, password_hash, role)
        .with_avatar(req.avatar);
    let saved = state.users.save(user).await?;

    tracing::info!(user_id = %saved.id, role = %saved.role, "User registered");
    Ok(HttpResponse::Created().json(ApiResponse::ok(issue_session(&state, &saved)?)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(issue_session(&state, &user)?)))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&identity.user))))
}
