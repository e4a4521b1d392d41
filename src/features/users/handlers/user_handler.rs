use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::guards::RequireUser;
use crate::features::users::dtos::{
    IdentityResponseDto, UnlinkIdentityResponseDto, UpdateUserDto, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

/// Get an account
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    RequireUser(caller): RequireUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    caller.ensure_can_act_for(id)?;
    let user = service.get_user_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

/// Update profile and assessment fields
///
/// Only the fields present in the body are changed.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not your account"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    RequireUser(caller): RequireUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    caller.ensure_can_act_for(id)?;
    let user = service.update_user(id, dto.into()).await?;
    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some("Profile updated".to_string()),
        None,
    )))
}

/// List the sign-in methods linked to an account
#[utoipa::path(
    get,
    path = "/api/users/{id}/identities",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Linked identities", body = ApiResponse<Vec<IdentityResponseDto>>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_identities(
    RequireUser(caller): RequireUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<IdentityResponseDto>>>> {
    caller.ensure_can_act_for(id)?;
    let identities: Vec<IdentityResponseDto> = service
        .get_user_identities(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = identities.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(identities),
        None,
        Some(Meta { total }),
    )))
}

/// Unlink every identity of a provider
///
/// Refused when it would leave the account without a way to sign in.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/identities/{provider}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("provider" = String, Path, description = "Identity provider, e.g. Google")
    ),
    responses(
        (status = 200, description = "Identity unlinked", body = ApiResponse<UnlinkIdentityResponseDto>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not your account"),
        (status = 400, description = "Last remaining identity"),
        (status = 404, description = "User or identity not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn unlink_identity(
    RequireUser(caller): RequireUser,
    State(service): State<Arc<UserService>>,
    Path((id, provider)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<UnlinkIdentityResponseDto>>> {
    caller.ensure_can_act_for(id)?;
    service.unlink_identity(id, &provider).await?;
    Ok(Json(ApiResponse::success(
        Some(UnlinkIdentityResponseDto { unlinked: true }),
        Some(format!("{} identity unlinked", provider)),
        None,
    )))
}
