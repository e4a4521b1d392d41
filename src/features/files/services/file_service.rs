use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::files::dtos::{FileMetadataResponseDto, FileResponseDto};
use crate::modules::storage::{ObjectStorage, SignedUpload, StorageFactory, StorageProvider};
use crate::shared::constants::USER_FILES_PREFIX;

/// Key namespace a caller may touch. Services see the whole bucket; users
/// only `users/<id>/`, and every key they send or get back is relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileScope {
    prefix: Option<String>,
}

impl FileScope {
    pub fn unrestricted() -> Self {
        Self { prefix: None }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            prefix: Some(format!("{}/{}", USER_FILES_PREFIX, user_id)),
        }
    }

    pub fn for_caller(caller: &AuthenticatedUser) -> Result<Self> {
        if caller.is_service() {
            return Ok(Self::unrestricted());
        }
        let user_id = caller.sub.parse::<Uuid>().map_err(|_| {
            AppError::Forbidden("File access requires a user account".to_string())
        })?;
        Ok(Self::user(user_id))
    }

    fn resolve(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key.to_string(),
        }
    }
}

/// File operations over whichever storage backend a request selects
pub struct FileService {
    storage: Arc<StorageFactory>,
}

impl FileService {
    pub fn new(storage: Arc<StorageFactory>) -> Self {
        Self { storage }
    }

    async fn backend(&self, provider: Option<StorageProvider>) -> Result<Arc<dyn ObjectStorage>> {
        Ok(self.storage.get_instance(provider).await?)
    }

    /// Store an uploaded file under `key`, or under a generated
    /// `<purpose>/<uuid>.<ext>` key when none is given.
    pub async fn upload_file(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        key: Option<String>,
        purpose: Option<String>,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<FileResponseDto> {
        let key = match key {
            Some(key) => checked_key(&key)?.to_string(),
            None => generated_key(purpose.as_deref(), original_filename),
        };
        let size = data.len() as u64;

        let storage = self.backend(provider).await?;
        storage
            .upload_data(&scope.resolve(&key), data, Some(content_type))
            .await?;
        info!(
            "Uploaded {} ({} bytes) to {}",
            key,
            size,
            storage.provider()
        );

        Ok(FileResponseDto {
            key,
            provider: storage.provider(),
            original_filename: original_filename.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    pub async fn download_url(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        key: &str,
        file_name: Option<&str>,
    ) -> Result<String> {
        let key = scope.resolve(checked_key(key)?);
        let storage = self.backend(provider).await?;
        debug!("Signing download URL for {} on {}", key, storage.provider());
        Ok(storage.generate_download_signed_url(&key, file_name).await?)
    }

    pub async fn upload_url(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<SignedUpload> {
        let key = scope.resolve(checked_key(key)?);
        let storage = self.backend(provider).await?;
        debug!("Signing upload URL for {} on {}", key, storage.provider());
        Ok(storage.generate_upload_signed_url(&key, content_type).await?)
    }

    pub async fn metadata(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        key: &str,
    ) -> Result<FileMetadataResponseDto> {
        let key = checked_key(key)?;
        let storage = self.backend(provider).await?;
        let metadata = storage.get_file_metadata(&scope.resolve(key)).await?;

        Ok(FileMetadataResponseDto {
            key: key.to_string(),
            provider: storage.provider(),
            metadata,
        })
    }

    pub async fn delete(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        key: &str,
    ) -> Result<()> {
        let key = checked_key(key)?;
        let storage = self.backend(provider).await?;
        storage.delete_file(&scope.resolve(key)).await?;
        info!("Deleted {} from {}", key, storage.provider());
        Ok(())
    }

    /// Server-side copy inside the caller's scope; the source must exist.
    pub async fn copy(
        &self,
        scope: &FileScope,
        provider: Option<StorageProvider>,
        source_key: &str,
        destination_key: &str,
    ) -> Result<()> {
        let source_key = checked_key(source_key)?;
        let destination_key = checked_key(destination_key)?;
        let storage = self.backend(provider).await?;

        if !storage.document_exists(&scope.resolve(source_key)).await? {
            return Err(AppError::NotFound(format!("File '{}' not found", source_key)));
        }
        storage
            .copy_file(&scope.resolve(source_key), &scope.resolve(destination_key))
            .await?;
        info!(
            "Copied {} to {} on {}",
            source_key,
            destination_key,
            storage.provider()
        );
        Ok(())
    }
}

/// Rejects blank keys and `..` segments.
fn checked_key(key: &str) -> Result<&str> {
    let trimmed = key.trim();
    if trimmed.trim_matches('/').is_empty() {
        return Err(AppError::BadRequest("File key is required".to_string()));
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(AppError::BadRequest(format!(
            "File key '{}' must not contain '..' segments",
            trimmed
        )));
    }
    Ok(trimmed)
}

fn generated_key(purpose: Option<&str>, original_filename: &str) -> String {
    let prefix = purpose
        .map(|p| p.trim().trim_matches('/'))
        .filter(|p| !p.is_empty() && !p.split('/').any(|s| s == ".."))
        .unwrap_or("uploads");
    let extension = original_filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");

    format!("{}/{}.{}", prefix, Uuid::now_v7(), extension.to_ascii_lowercase())
}
