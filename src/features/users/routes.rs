use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/api/users/{id}",
            get(handlers::get_user).patch(handlers::update_user),
        )
        .route("/api/users/{id}/identities", get(handlers::list_identities))
        .route(
            "/api/users/{id}/identities/{provider}",
            delete(handlers::unlink_identity),
        )
        .with_state(service)
}
