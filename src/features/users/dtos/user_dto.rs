use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserIdentity, UserPatch};
use crate::shared::constants::META_PASSWORD_HASH;

/// Account as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            gender: u.gender,
            age: u.age,
            dob: u.dob,
            job_role: u.job_role,
            city: u.city,
            work_duration: u.work_duration,
            distance: u.distance,
            job_type: u.job_type,
            salary: u.salary,
            company: u.company,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Linked sign-in method. Password hashes are never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponseDto {
    pub id: Uuid,
    pub provider: String,
    pub provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<UserIdentity> for IdentityResponseDto {
    fn from(i: UserIdentity) -> Self {
        let metadata = i.metadata.map(|mut m| {
            if let Some(object) = m.as_object_mut() {
                object.remove(META_PASSWORD_HASH);
            }
            m
        });

        Self {
            id: i.id,
            provider: i.provider,
            provider_id: i.provider_id,
            metadata,
            created_at: i.created_at,
        }
    }
}

/// Request DTO for updating profile and assessment fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 32, message = "Gender must not exceed 32 characters"))]
    pub gender: Option<String>,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,

    pub dob: Option<NaiveDate>,

    #[validate(length(max = 128, message = "Job role must not exceed 128 characters"))]
    pub job_role: Option<String>,

    #[validate(length(max = 128, message = "City must not exceed 128 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 64, message = "Work duration must not exceed 64 characters"))]
    pub work_duration: Option<String>,

    /// Commute distance in kilometres
    #[validate(range(min = 0.0, message = "Distance must not be negative"))]
    pub distance: Option<f64>,

    #[validate(length(max = 64, message = "Job type must not exceed 64 characters"))]
    pub job_type: Option<String>,

    #[validate(range(min = 0.0, message = "Salary must not be negative"))]
    pub salary: Option<f64>,

    #[validate(length(max = 128, message = "Company must not exceed 128 characters"))]
    pub company: Option<String>,
}

impl From<UpdateUserDto> for UserPatch {
    fn from(dto: UpdateUserDto) -> Self {
        Self {
            name: dto.name,
            gender: dto.gender,
            age: dto.age,
            dob: dto.dob,
            job_role: dto.job_role,
            city: dto.city,
            work_duration: dto.work_duration,
            distance: dto.distance,
            job_type: dto.job_type,
            salary: dto.salary,
            company: dto.company,
        }
    }
}

/// Response DTO for an unlinked identity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkIdentityResponseDto {
    pub unlinked: bool,
}
