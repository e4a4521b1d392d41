use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::storage::{ObjectMetadata, StorageProvider};

/// Upload file request DTO for OpenAPI documentation.
/// The handler reads the multipart form directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Object key; generated under `purpose/` when omitted
    #[schema(example = "reports/2026/weekly.pdf")]
    pub key: Option<String>,
    /// Key prefix for generated keys
    #[schema(example = "avatars")]
    pub purpose: Option<String>,
    /// Storage backend; defaults to the one configured for the deployment
    pub provider: Option<StorageProvider>,
}

/// Response DTO for an uploaded file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponseDto {
    pub key: String,
    pub provider: StorageProvider,
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
}

/// Query for operations addressing one object
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileKeyQuery {
    /// Object key relative to the storage base path
    #[validate(length(min = 1, max = 1024, message = "Key must be 1-1024 characters"))]
    pub key: String,
    /// Storage backend; defaults to the one configured for the deployment
    pub provider: Option<StorageProvider>,
}

/// Query for a signed download URL
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DownloadUrlQuery {
    #[validate(length(min = 1, max = 1024, message = "Key must be 1-1024 characters"))]
    pub key: String,
    /// When set, the URL forces a download under this name
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: Option<String>,
    pub provider: Option<StorageProvider>,
}

/// Response DTO for a signed download URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadUrlResponseDto {
    pub url: String,
}

/// Request DTO for a signed upload URL
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequestDto {
    #[validate(length(min = 1, max = 1024, message = "Key must be 1-1024 characters"))]
    pub key: String,
    /// Content type the client will upload with
    #[validate(length(min = 1, max = 255, message = "Content type must be 1-255 characters"))]
    pub content_type: Option<String>,
    pub provider: Option<StorageProvider>,
}

/// Request DTO for deleting an object
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeleteFileDto {
    #[validate(length(min = 1, max = 1024, message = "Key must be 1-1024 characters"))]
    pub key: String,
    pub provider: Option<StorageProvider>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

/// Request DTO for a server-side copy
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileDto {
    #[validate(length(min = 1, max = 1024, message = "Source key must be 1-1024 characters"))]
    pub source_key: String,
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Destination key must be 1-1024 characters"
    ))]
    pub destination_key: String,
    pub provider: Option<StorageProvider>,
}

/// Response DTO for object metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataResponseDto {
    pub key: String,
    pub provider: StorageProvider,
    #[serde(flatten)]
    pub metadata: ObjectMetadata,
}
