//! Authorization guards.
//!
//! Each guard is an independent predicate over the caller. Services compose
//! them before touching a store; each failure maps to a distinct error kind.

use uuid::Uuid;

use crate::domain::Role;
use crate::error::DomainError;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The caller must present a valid session identity.
pub fn protect(actor: Option<&Actor>) -> Result<&Actor, DomainError> {
    actor.ok_or(DomainError::Unauthenticated)
}

/// The caller's role must equal `required`.
pub fn authorize(actor: &Actor, required: Role) -> Result<(), DomainError> {
    if actor.role == required {
        Ok(())
    } else {
        Err(DomainError::Forbidden {
            role: actor.role.to_string(),
        })
    }
}

/// The caller must own the resource or be an admin.
pub fn ensure_owner_or_admin(
    actor: &Actor,
    owner_id: Uuid,
    entity: &'static str,
) -> Result<(), DomainError> {
    if actor.user_id == owner_id || actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Unauthorized(entity))
    }
}
