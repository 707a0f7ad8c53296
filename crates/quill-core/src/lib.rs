//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities and their validation rules, authorization guards, the repository and
//! auth ports, and the services that keep categories and posts consistent.

pub mod authz;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use authz::Actor;
pub use error::{DomainError, FieldError, RepoError};
