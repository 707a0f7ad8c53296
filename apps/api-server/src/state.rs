//! Application state - shared across all handlers.

use std::collections::HashSet;
use std::sync::Arc;

use quill_core::domain::Role;
use quill_core::ports::{
    CategoryRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_core::services::{CategoryService, PostService};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService,
};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use quill_infra::database::{
    DatabaseConnections, PostgresCategoryRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// The three document stores behind the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    /// Which backend the stores use, for logs and the health endpoint.
    pub backend: &'static str,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            backend: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(connections.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
            backend: "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub categories: CategoryService,
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub admin_emails: Arc<HashSet<String>>,
    pub backend: &'static str,
}

impl AppState {
    /// Wire services over the given stores.
    pub fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        admin_emails: HashSet<String>,
    ) -> Self {
        Self {
            categories: CategoryService::new(repos.categories.clone(), repos.posts.clone()),
            posts: PostService::new(repos.posts, repos.categories, repos.users.clone()),
            users: repos.users,
            tokens,
            passwords,
            admin_emails: Arc::new(admin_emails),
            backend: repos.backend,
        }
    }

    /// Build the application state, preferring PostgreSQL when configured and
    /// reachable and falling back to in-memory stores otherwise.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::connect(config).await;
        tracing::info!(backend = repos.backend, "Application state initialized");

        Self::from_parts(
            repos,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            config.admin_emails.clone(),
        )
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Repositories {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::in_memory();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => Repositories::postgres(&connections),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                Repositories::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Repositories::in_memory()
    }

    /// Role granted to a newly registered account.
    pub fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.contains(&email.trim().to_lowercase()) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_infra::JwtConfig;

    #[test]
    fn test_role_for_admin_emails() {
        let state = AppState::from_parts(
            Repositories::in_memory(),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
            HashSet::from(["admin@example.com".to_string()]),
        );

        assert_eq!(state.role_for(" Admin@Example.com"), Role::Admin);
        assert_eq!(state.role_for("reader@example.com"), Role::User);
        assert_eq!(state.backend, "memory");
    }
}
