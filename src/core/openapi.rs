use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::modules::storage::{ObjectMetadata, SignedUpload, StorageProvider};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::phone_login,
        auth_handlers::oauth_login,
        // Users
        users_handlers::get_user,
        users_handlers::update_user,
        users_handlers::list_identities,
        users_handlers::unlink_identity,
        // Files
        files_handlers::upload_file,
        files_handlers::download_url,
        files_handlers::upload_url,
        files_handlers::file_metadata,
        files_handlers::delete_file,
        files_handlers::copy_file,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::PhoneLoginRequestDto,
            auth_dtos::OAuthLoginRequestDto,
            auth_dtos::AuthResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::IdentityResponseDto,
            users_dtos::UpdateUserDto,
            users_dtos::UnlinkIdentityResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::IdentityResponseDto>>,
            ApiResponse<users_dtos::UnlinkIdentityResponseDto>,
            // Files
            StorageProvider,
            ObjectMetadata,
            SignedUpload,
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::DownloadUrlResponseDto,
            files_dtos::UploadUrlRequestDto,
            files_dtos::DeleteFileDto,
            files_dtos::DeleteFileResponseDto,
            files_dtos::CopyFileDto,
            files_dtos::FileMetadataResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<files_dtos::DownloadUrlResponseDto>,
            ApiResponse<SignedUpload>,
            ApiResponse<files_dtos::FileMetadataResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration and sign-in (email/password, phone, OAuth profiles)"),
        (name = "users", description = "User profiles and linked sign-in identities"),
        (name = "files", description = "Object storage across S3, Azure Blob and Cloud Storage"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Wellnest API",
        version = "0.1.0",
        description = "API documentation for Wellnest",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
