//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod mapping;
mod posts;

use actix_web::{HttpResponse, web};

use quill_shared::ApiError;

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new("Route not found"))
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/{id}", web::get().to(categories::get))
                    .route("/{id}", web::put().to(categories::update))
                    .route("/{id}", web::delete().to(categories::delete)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    // Must precede `/{id}`.
                    .route("/search", web::get().to(posts::search))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .default_service(web::to(route_not_found)),
    );
}
