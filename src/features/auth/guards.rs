//! Request guards over the [`AuthenticatedUser`] that `auth_middleware`
//! places in the request extensions.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Any caller with a verified token.
pub struct RequireUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequireUser(authenticated(parts)?))
    }
}

/// Trusted backend callers only. Guards the endpoints that accept an
/// identity the caller claims to have verified (phone, OAuth profile).
pub struct RequireService(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireService
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        if !user.is_service() {
            return Err(AppError::Forbidden("Service access required".to_string()));
        }
        Ok(RequireService(user))
    }
}
