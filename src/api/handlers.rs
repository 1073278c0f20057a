use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::errors::ApiError;
use super::extractors::AuthenticatedUser;
use super::AppState;
use crate::domain::order::OrderRequest;
use crate::models::{Credentials, ProfileUpdate, Registration};

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Debug, Deserialize)]
pub struct RestaurantQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateBody {
    pub rating: u8,
    pub comment: Option<String>,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// ============================================================================
// Auth & Profile
// ============================================================================

#[instrument(name = "handler::login", skip(state, body), fields(email = %body.email))]
pub async fn login(state: web::Data<AppState>, body: web::Json<Credentials>) -> ApiResult {
    let session = state.backend.login(&body).map_err(|e| state.reject(e))?;
    info!(user_id = %session.user.id, "Login succeeded");
    Ok(HttpResponse::Ok().json(session))
}

#[instrument(name = "handler::register", skip(state, body), fields(email = %body.email))]
pub async fn register(state: web::Data<AppState>, body: web::Json<Registration>) -> ApiResult {
    let session = state.backend.register(&body).map_err(|e| state.reject(e))?;
    info!(user_id = %session.user.id, "Registration succeeded");
    Ok(HttpResponse::Created().json(session))
}

pub async fn logout(state: web::Data<AppState>, user: AuthenticatedUser) -> HttpResponse {
    state.backend.logout(&user.token);
    HttpResponse::NoContent().finish()
}

pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ProfileUpdate>,
) -> ApiResult {
    let profile = state
        .backend
        .update_profile(&user.user_id, &body)
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(profile))
}

// ============================================================================
// Catalog
// ============================================================================

pub async fn list_restaurants(
    state: web::Data<AppState>,
    query: web::Query<RestaurantQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.backend.list_restaurants(query.category.as_deref()))
}

pub async fn get_restaurant(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let details = state
        .backend
        .get_restaurant(&path)
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(details))
}

pub async fn list_categories(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.backend.list_categories())
}

// ============================================================================
// Orders
// ============================================================================

pub async fn list_orders(state: web::Data<AppState>, user: AuthenticatedUser) -> ApiResult {
    let orders = state
        .backend
        .list_orders(&user.user_id)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult {
    let details = state
        .backend
        .get_order(&user.user_id, &path)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(details))
}

#[instrument(name = "handler::place_order", skip(state, user, body), fields(user_id = %user.user_id))]
pub async fn place_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<OrderRequest>,
) -> ApiResult {
    let order = state
        .backend
        .place_order(&user.user_id, body.into_inner())
        .await
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn cancel_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: Option<web::Json<CancelBody>>,
) -> ApiResult {
    let reason = body.and_then(|b| b.into_inner().reason);
    let order = state
        .backend
        .cancel_order(&user.user_id, &path, reason)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn rate_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<RateBody>,
) -> ApiResult {
    let RateBody { rating, comment } = body.into_inner();
    let order = state
        .backend
        .rate_order(&user.user_id, &path, rating, comment)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(HttpResponse::Ok().json(order))
}
