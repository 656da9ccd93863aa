/// HTTP request handlers (REST API)
pub mod auth;
pub mod images;
pub mod users;

use actix_web::{web, HttpResponse};

use crate::middleware::JwtAuthMiddleware;

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "auth-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Register every route. `/users` and `/images` require a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/signin", web::post().to(auth::signin))
                .route("/refresh_token", web::get().to(auth::refresh_token)),
        )
        .service(
            web::scope("/users")
                .wrap(JwtAuthMiddleware)
                .route("", web::get().to(users::search_users))
                .route("/me", web::get().to(users::me))
                .route("/{user_id}", web::get().to(users::get_user))
                .route("/{user_id}", web::put().to(users::update_user))
                .route("/{user_id}", web::delete().to(users::delete_user))
                .route("/{user_id}/ban", web::patch().to(users::ban_user))
                .route("/{user_id}/role", web::patch().to(users::change_role)),
        )
        .service(
            web::scope("/images")
                .wrap(JwtAuthMiddleware)
                .route("", web::get().to(images::list_images))
                .route("", web::post().to(images::create_image))
                .route("/{image_id}", web::get().to(images::get_image))
                .route("/{image_id}", web::patch().to(images::update_image))
                .route("/{image_id}", web::delete().to(images::delete_image)),
        );
}
