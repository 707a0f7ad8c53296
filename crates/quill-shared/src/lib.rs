//! # Quill Shared
//!
//! Wire types shared between the API server and the client library:
//! request/response DTOs and the uniform JSON envelope.

pub mod dto;
pub mod response;

pub use response::{ApiError, ApiResponse, FieldErrorBody};
