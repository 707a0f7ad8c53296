//! # Quill API Server
//!
//! Actix-web REST backend for the blog: categories, posts, comments and
//! account sessions, all answering with the `{ success, data | error }` envelope.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

use actix_web::web;

pub use config::AppConfig;
pub use state::{AppState, Repositories};

/// Register extractor error handling and every route.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(middleware::error::json_config())
        .app_data(middleware::error::path_config())
        .app_data(middleware::error::query_config())
        .configure(handlers::configure_routes);
}
