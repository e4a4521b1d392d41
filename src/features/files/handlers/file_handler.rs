use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidatedJson;
use crate::features::files::dtos::{
    CopyFileDto, DeleteFileDto, DeleteFileResponseDto, DownloadUrlQuery, DownloadUrlResponseDto,
    FileKeyQuery, FileMetadataResponseDto, FileResponseDto, UploadFileDto, UploadUrlRequestDto,
};
use crate::features::auth::guards::RequireUser;
use crate::features::files::services::{FileScope, FileService};
use crate::modules::storage::{SignedUpload, StorageProvider};
use crate::shared::constants::MAX_UPLOAD_SIZE;
use crate::shared::types::ApiResponse;

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `key`: Object key (optional)
/// - `purpose`: Prefix for a generated key (optional)
/// - `provider`: Storage backend (optional)
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with optional key, purpose and provider fields",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Invalid file or form field"),
        (status = 413, description = "File too large"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    let mut file = None;
    let mut key = None;
    let mut purpose = None;
    let mut provider = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some((file_name, content_type, data));
            }
            "key" | "purpose" | "provider" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                })?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match field_name.as_str() {
                    "key" => key = Some(text),
                    "purpose" => purpose = Some(text),
                    _ => provider = Some(text.parse::<StorageProvider>().map_err(AppError::from)?),
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_UPLOAD_SIZE,
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    let scope = FileScope::for_caller(&caller)?;
    let response = service
        .upload_file(
            &scope,
            provider,
            key,
            purpose,
            &file_name,
            &content_type,
            data,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Get a time-limited download URL
#[utoipa::path(
    get,
    path = "/api/files/download-url",
    tag = "files",
    params(DownloadUrlQuery),
    responses(
        (status = 200, description = "Signed download URL", body = ApiResponse<DownloadUrlResponseDto>),
        (status = 400, description = "Invalid key or provider"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_url(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    Query(query): Query<DownloadUrlQuery>,
) -> Result<Json<ApiResponse<DownloadUrlResponseDto>>> {
    query.validate().map_err(AppError::from_validation)?;

    let scope = FileScope::for_caller(&caller)?;
    let url = service
        .download_url(
            &scope,
            query.provider,
            &query.key,
            query.file_name.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(
        Some(DownloadUrlResponseDto { url }),
        None,
        None,
    )))
}

/// Get a time-limited upload URL
///
/// The client must send the returned headers with its PUT request.
#[utoipa::path(
    post,
    path = "/api/files/upload-url",
    tag = "files",
    request_body = UploadUrlRequestDto,
    responses(
        (status = 200, description = "Signed upload URL", body = ApiResponse<SignedUpload>),
        (status = 400, description = "Invalid key or provider"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_url(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    ValidatedJson(dto): ValidatedJson<UploadUrlRequestDto>,
) -> Result<Json<ApiResponse<SignedUpload>>> {
    let scope = FileScope::for_caller(&caller)?;
    let signed = service
        .upload_url(&scope, dto.provider, &dto.key, dto.content_type.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(signed), None, None)))
}

/// Get object metadata
#[utoipa::path(
    get,
    path = "/api/files/metadata",
    tag = "files",
    params(FileKeyQuery),
    responses(
        (status = 200, description = "Object metadata", body = ApiResponse<FileMetadataResponseDto>),
        (status = 404, description = "File not found"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn file_metadata(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    Query(query): Query<FileKeyQuery>,
) -> Result<Json<ApiResponse<FileMetadataResponseDto>>> {
    query.validate().map_err(AppError::from_validation)?;

    let scope = FileScope::for_caller(&caller)?;
    let metadata = service.metadata(&scope, query.provider, &query.key).await?;
    Ok(Json(ApiResponse::success(Some(metadata), None, None)))
}

/// Delete a file
#[utoipa::path(
    delete,
    path = "/api/files",
    tag = "files",
    request_body = DeleteFileDto,
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 404, description = "File not found"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    ValidatedJson(dto): ValidatedJson<DeleteFileDto>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    let scope = FileScope::for_caller(&caller)?;
    service.delete(&scope, dto.provider, &dto.key).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// Copy a file within the same backend
#[utoipa::path(
    post,
    path = "/api/files/copy",
    tag = "files",
    request_body = CopyFileDto,
    responses(
        (status = 200, description = "File copied", body = ApiResponse<FileMetadataResponseDto>),
        (status = 404, description = "Source file not found"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn copy_file(
    State(service): State<Arc<FileService>>,
    RequireUser(caller): RequireUser,
    ValidatedJson(dto): ValidatedJson<CopyFileDto>,
) -> Result<Json<ApiResponse<FileMetadataResponseDto>>> {
    let scope = FileScope::for_caller(&caller)?;
    service
        .copy(&scope, dto.provider, &dto.source_key, &dto.destination_key)
        .await?;
    let copied = service
        .metadata(&scope, dto.provider, &dto.destination_key)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(copied),
        Some("File copied successfully".to_string()),
        None,
    )))
}
