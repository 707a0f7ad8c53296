//! The uniform JSON envelope every endpoint responds with.
//!
//! Success: `{ "success": true, "data": ..., "count"?: n }`
//! Failure: `{ "success": false, "error": "...", "errors"?: [{ "field", "message" }] }`

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list payload, with `count` set to its length.
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
        }
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorBody>>,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldErrorBody>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn internal_error() -> Self {
        Self::new("Server Error")
    }
}
