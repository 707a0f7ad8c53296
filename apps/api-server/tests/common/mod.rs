use std::collections::HashSet;
use std::sync::Arc;

use api_server::{AppState, Repositories};
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// In-memory state with `ADMIN_EMAIL` as the only admin address.
pub fn test_state() -> AppState {
    AppState::from_parts(
        Repositories::in_memory(),
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "quill-test".to_string(),
        })),
        // Low cost parameters keep hashing fast in tests.
        Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap()),
        HashSet::from([ADMIN_EMAIL.to_string()]),
    )
}
