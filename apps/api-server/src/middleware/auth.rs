//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::Future;
use std::pin::Pin;

use quill_core::authz::protect;
use quill_core::domain::User;
use quill_core::ports::{AuthError, BaseRepository};
use quill_core::{Actor, DomainError};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// The authenticated caller, loaded fresh from the user store.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub actor: Actor,
    pub user: User,
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::MissingAuth),
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::Internal("AppState not found in app data".to_string())
            })?;

            let claims = state.tokens.validate_token(&token?)?;

            // Role comes from the stored account, not the token.
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await
                .map_err(DomainError::from)?;
            let actor = user.as_ref().map(|u| Actor::new(u.id, u.role));
            let actor = *protect(actor.as_ref())?;

            match user {
                Some(user) => Ok(Identity { actor, user }),
                None => Err(DomainError::Unauthenticated.into()),
            }
        })
    }
}
