//! Domain-level error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single failed validation rule, attributed to an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not authorized, no valid session")]
    Unauthenticated,

    #[error("Role '{role}' is not allowed to perform this action")]
    Forbidden { role: String },

    #[error("Not authorized to modify this {0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }

    /// Shorthand for a validation failure on one field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_field_messages() {
        let err = DomainError::Validation(vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("content", "Content is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Title is required, Content is required"
        );
    }
}
