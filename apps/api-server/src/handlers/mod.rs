//! HTTP handlers and route configuration.

mod categories;
mod form;
mod health;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, error, web};
use inkpost_shared::ErrorResponse;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(path_config()).app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Categories
            .service(
                web::scope("/categories")
                    .route("", web::post().to(categories::create_category))
                    .route("", web::get().to(categories::list_categories))
                    .route("/{id}", web::get().to(categories::get_category))
                    .route("/{id}", web::patch().to(categories::update_category))
                    .route("/{id}", web::delete().to(categories::delete_category))
                    .route("/{id}/posts", web::get().to(categories::list_category_posts)),
            )
            // Posts; writes take an `Identity`
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route(
                        "/categories/{category}",
                        web::get().to(posts::list_posts_by_category),
                    )
                    .route("/users/{id}", web::get().to(posts::list_posts_by_user))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::patch().to(posts::edit_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .route("/users/{id}", web::get().to(users::get_user)),
    );
}

/// Path segments that fail to parse cannot name a record.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        tracing::debug!(path = %req.path(), error = %err, "Unparseable path segment");
        let body = ErrorResponse::not_found(format!("no resource at {}", req.path()));
        error::InternalError::from_response(err, HttpResponse::NotFound().json(body)).into()
    })
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::bad_request(err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
