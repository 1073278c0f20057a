use actix_web::web;

use super::errors::ApiError;
use super::handlers;

/// Register every route. `AppState` must be added with `App::app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health))
    .service(
        web::scope("/auth")
            .route("/login", web::post().to(handlers::login))
            .route("/register", web::post().to(handlers::register))
            .route("/logout", web::post().to(handlers::logout)),
    )
    .route("/users/profile", web::put().to(handlers::update_profile))
    .route("/restaurant", web::get().to(handlers::list_restaurants))
    .route("/restaurant/{id}", web::get().to(handlers::get_restaurant))
    .route("/categories", web::get().to(handlers::list_categories))
    .service(
        web::scope("/orders")
            .route("", web::post().to(handlers::place_order))
            // before /{id} so "customer" is not taken for an order id
            .route("/customer", web::get().to(handlers::list_orders))
            .route("/{id}", web::get().to(handlers::get_order))
            .route("/{id}/cancel", web::post().to(handlers::cancel_order))
            .route("/{id}/rate", web::post().to(handlers::rate_order)),
    );
}
