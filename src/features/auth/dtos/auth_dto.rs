use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::UserResponseDto;
use crate::features::users::services::{OAuthProfile, Registration};
use crate::shared::validation::{PHONE_REGEX, PROVIDER_NAME_REGEX};

/// Request DTO for email + password registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 32, message = "Gender must not exceed 32 characters"))]
    pub gender: Option<String>,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,

    pub dob: Option<NaiveDate>,
}

impl From<RegisterRequestDto> for Registration {
    fn from(dto: RegisterRequestDto) -> Self {
        Self {
            email: dto.email,
            password: dto.password,
            name: dto.name,
            gender: dto.gender,
            age: dto.age,
            dob: dto.dob,
        }
    }
}

/// Request DTO for email + password login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO for phone sign-in after the one-time password was verified
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PhoneLoginRequestDto {
    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Invalid phone number"
    ))]
    pub phone: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: Option<String>,
}

/// Request DTO for sign-in with a profile verified by an OAuth provider
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthLoginRequestDto {
    #[validate(regex(
        path = *PROVIDER_NAME_REGEX,
        message = "Invalid provider name"
    ))]
    pub provider: String,

    #[validate(length(min = 1, max = 255, message = "Provider ID must be 1-255 characters"))]
    pub provider_id: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: Option<String>,

    /// Profile as returned by the provider, stored when no metadata is given
    pub raw_profile: Option<Value>,

    /// Merged into the stored identity metadata on every sign-in
    pub metadata: Option<Value>,
}

impl OAuthLoginRequestDto {
    pub fn into_parts(self) -> (OAuthProfile, Option<Value>) {
        (
            OAuthProfile {
                provider: self.provider,
                provider_id: self.provider_id,
                email: self.email,
                name: self.name,
                raw_profile: self.raw_profile,
            },
            self.metadata,
        )
    }
}

/// Response DTO for every sign-in flow
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    pub user: UserResponseDto,
}
