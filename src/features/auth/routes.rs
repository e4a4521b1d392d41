use crate::features::auth::handlers;
use crate::features::users::services::UserService;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Registration and password login. No tokens are issued here.
pub fn public_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Sign-in flows that trust a caller-verified identity; mounted behind
/// `auth_middleware` and limited to service callers.
pub fn protected_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/auth/phone", post(handlers::phone_login))
        .route("/api/auth/oauth", post(handlers::oauth_login))
        .with_state(service)
}
