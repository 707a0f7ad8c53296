//! Error handling - every failure leaves the server as a `{ success: false, error }` envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};

use quill_core::error::{DomainError, FieldError, RepoError};
use quill_core::ports::AuthError;
use quill_shared::{ApiError, FieldErrorBody};

/// Application-level error type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<FieldErrorBody>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ApiError::internal_error()
            }
            AppError::BadRequest { message, errors } if !errors.is_empty() => {
                ApiError::new(message.clone()).with_errors(errors.clone())
            }
            other => ApiError::new(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

fn field_errors(errors: &[FieldError]) -> Vec<FieldErrorBody> {
    errors
        .iter()
        .map(|e| FieldErrorBody {
            field: e.field.clone(),
            message: e.message.clone(),
        })
        .collect()
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(ref errors) => AppError::BadRequest {
                message: err.to_string(),
                errors: field_errors(errors),
            },
            DomainError::Duplicate(message) | DomainError::Conflict(message) => {
                AppError::bad_request(message)
            }
            DomainError::Unauthenticated
            | DomainError::Forbidden { .. }
            | DomainError::Unauthorized(_) => AppError::Unauthorized(err.to_string()),
            DomainError::Repository(e) => e.into(),
            DomainError::Internal(message) => AppError::Internal(message),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(detail) => {
                tracing::debug!(detail = %detail, "Constraint violation");
                AppError::bad_request("Duplicate field value entered")
            }
            RepoError::Connection(msg) => {
                AppError::Internal(format!("Database connection error: {}", msg))
            }
            RepoError::Query(msg) => AppError::Internal(format!("Database query error: {}", msg)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::MissingAuth => {
                AppError::Unauthorized("Not authorized, no token".to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                tracing::debug!(error = %err, "Rejected session token");
                AppError::Unauthorized("Not authorized, token failed".to_string())
            }
            AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

/// JSON body extraction errors go out as 400 envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::bad_request(format!("Invalid request body: {}", err)).into()
    })
}

/// Malformed path identifiers go out as 400 envelopes.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected path parameter");
        AppError::bad_request("Invalid identifier").into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::bad_request(format!("Invalid query string: {}", err)).into()
    })
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
