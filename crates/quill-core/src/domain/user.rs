use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Identifiable;
use crate::error::{DomainError, FieldError};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_USER_NAME_LEN: usize = 50;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User entity - an account that can author posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    ///
    /// The email is stored lowercased so lookups are case-insensitive.
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email: email.trim().to_lowercase(),
            avatar: None,
            role,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = avatar.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Check sign-up input before any hashing or store access.
pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), DomainError> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > MAX_USER_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name cannot exceed {} characters", MAX_USER_NAME_LEN),
        ));
    }

    if !is_plausible_email(email.trim()) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl Identifiable for User {
    fn id(&self) -> Uuid {
        self.id
    }
}
