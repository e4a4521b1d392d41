use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidatedJson;
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, OAuthLoginRequestDto, PhoneLoginRequestDto,
    RegisterRequestDto,
};
use crate::features::auth::guards::RequireService;
use crate::features::users::services::UserService;
use crate::shared::constants::{PROVIDER_EMAIL_PASSWORD, PROVIDER_PHONE_OTP};
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Register with email and password
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<UserService>>,
    ValidatedJson(dto): ValidatedJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let user = service.register_with_email_password(dto.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(AuthResponseDto { user: user.into() }),
            Some("Registration successful".to_string()),
            None,
        )),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<UserService>>,
    ValidatedJson(dto): ValidatedJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<AuthResponseDto>>> {
    let user = service
        .authenticate_with_email_password(&dto.email, &dto.password)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(AuthResponseDto { user: user.into() }),
        None,
        None,
    )))
}

/// Sign in with a verified phone number
///
/// Creates the account on first use. Only backend services that verified the
/// number themselves may call this.
#[utoipa::path(
    post,
    path = "/api/auth/phone",
    request_body = PhoneLoginRequestDto,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Service role required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn phone_login(
    RequireService(_caller): RequireService,
    State(service): State<Arc<UserService>>,
    ValidatedJson(dto): ValidatedJson<PhoneLoginRequestDto>,
) -> Result<Json<ApiResponse<AuthResponseDto>>> {
    let user = service
        .find_or_create_user_by_phone(&dto.phone, dto.name)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(AuthResponseDto { user: user.into() }),
        None,
        None,
    )))
}

/// Sign in with a profile verified by an OAuth provider
///
/// Links the provider to an existing account with the same email, or
/// creates a new account. Only backend services that completed the OAuth
/// exchange themselves may call this.
#[utoipa::path(
    post,
    path = "/api/auth/oauth",
    request_body = OAuthLoginRequestDto,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Service role required"),
        (status = 409, description = "Identity already linked elsewhere")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn oauth_login(
    RequireService(_caller): RequireService,
    State(service): State<Arc<UserService>>,
    ValidatedJson(dto): ValidatedJson<OAuthLoginRequestDto>,
) -> Result<Json<ApiResponse<AuthResponseDto>>> {
    if dto.provider == PROVIDER_EMAIL_PASSWORD || dto.provider == PROVIDER_PHONE_OTP {
        return Err(AppError::BadRequest(format!(
            "{} is not an OAuth provider",
            dto.provider
        )));
    }

    let (profile, metadata) = dto.into_parts();
    let user = service.find_or_create_user(profile, metadata).await?;
    Ok(Json(ApiResponse::success(
        Some(AuthResponseDto { user: user.into() }),
        None,
        None,
    )))
}
