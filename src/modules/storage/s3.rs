//! AWS S3 adapter built on rust-s3.
//!
//! Works against AWS itself or any S3-compatible endpoint (MinIO, local
//! mocks) when `AWS_ENDPOINT_URL` is set, in which case path-style addressing
//! is used.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::error::{required, Result, StorageError};
use super::provider::{
    attachment_disposition, ByteStream, ObjectMetadata, ObjectStorage, ObjectWriter,
    SignedUpload, StorageProvider, DEFAULT_CONTENT_TYPE,
};
use super::signed_url_expiry;
use crate::core::config::StorageConfig;

const DEFAULT_DOWNLOAD_EXPIRY: Duration = Duration::from_secs(15 * 60);
const DEFAULT_UPLOAD_EXPIRY: Duration = Duration::from_secs(15 * 60);

pub struct AwsS3Storage {
    bucket: Box<Bucket>,
    base_path: String,
    download_expiry: Duration,
    upload_expiry: Duration,
}

impl AwsS3Storage {
    /// Build the adapter from configuration. Fails on the first missing
    /// setting, checked in the order bucket, region, access key, secret key.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let bucket_name = required(&config.bucket_name, "BUCKET_NAME")?;
        let region_name = required(&config.s3.region, "AWS_REGION")?;
        let access_key = required(&config.s3.access_key_id, "AWS_ACCESS_KEY_ID")?;
        let secret_key = required(&config.s3.secret_access_key, "AWS_SECRET_ACCESS_KEY")?;

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| {
                StorageError::Configuration(format!("Failed to create S3 credentials: {}", e))
            })?;

        let endpoint = config
            .s3
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region_name.to_string(),
                endpoint: endpoint.trim_end_matches('/').to_string(),
            },
            None => region_name.parse::<Region>().map_err(|e| {
                StorageError::Configuration(format!("Invalid AWS_REGION '{}': {}", region_name, e))
            })?,
        };

        let mut bucket = Bucket::new(bucket_name, region, credentials).map_err(|e| {
            StorageError::Configuration(format!("Failed to create S3 bucket handle: {}", e))
        })?;
        if endpoint.is_some() {
            bucket.set_path_style();
        }

        info!(
            "S3 storage initialized for bucket: {}, region: {}",
            bucket_name, region_name
        );

        Ok(Self {
            bucket,
            base_path: config.base_path.clone(),
            download_expiry: signed_url_expiry(
                config.download_url_expiry_secs,
                DEFAULT_DOWNLOAD_EXPIRY,
            ),
            upload_expiry: signed_url_expiry(config.upload_url_expiry_secs, DEFAULT_UPLOAD_EXPIRY),
        })
    }

    fn presign_secs(expiry: Duration) -> u32 {
        u32::try_from(expiry.as_secs()).unwrap_or(u32::MAX)
    }
}

fn s3_error(action: &str, path: &str, err: S3Error) -> StorageError {
    StorageError::Io(format!("Failed to {} '{}': {}", action, path, err))
}

/// Map a non-2xx status to an error; 404 becomes `NotFound`.
fn check_status(status: u16, action: &str, path: &str) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::not_found(path)),
        other => Err(StorageError::Io(format!(
            "Failed to {} '{}': HTTP {}",
            action, path, other
        ))),
    }
}

#[async_trait]
impl ObjectStorage for AwsS3Storage {
    fn provider(&self) -> StorageProvider {
        StorageProvider::AwsS3
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn upload_file(&self, source: &Path, destination_key: &str) -> Result<()> {
        let path = self.full_path(destination_key);
        let mut file = tokio::fs::File::open(source).await?;

        let response = self
            .bucket
            .put_object_stream(&mut file, &path)
            .await
            .map_err(|e| s3_error("upload", &path, e))?;
        check_status(response.status_code(), "upload", &path)?;

        debug!("Uploaded {} to s3://{}/{}", source.display(), self.bucket.name(), path);
        Ok(())
    }

    async fn upload_data(
        &self,
        destination_key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<()> {
        let path = self.full_path(destination_key);
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);

        let response = self
            .bucket
            .put_object_with_content_type(&path, &data, content_type)
            .await
            .map_err(|e| s3_error("upload", &path, e))?;
        check_status(response.status_code(), "upload", &path)?;

        debug!("Uploaded {} bytes to s3://{}/{}", data.len(), self.bucket.name(), path);
        Ok(())
    }

    async fn download_document(&self, source_key: &str, destination: &Path) -> Result<()> {
        let path = self.full_path(source_key);
        let mut file = tokio::fs::File::create(destination).await?;

        let outcome = match self.bucket.get_object_to_writer(&path, &mut file).await {
            Ok(status) => check_status(status, "download", &path),
            Err(e) => Err(s3_error("download", &path, e)),
        };

        if outcome.is_err() {
            drop(file);
            let _ = tokio::fs::remove_file(destination).await;
        }
        outcome?;

        debug!("Downloaded s3://{}/{} to {}", self.bucket.name(), path, destination.display());
        Ok(())
    }

    async fn get_data(&self, key: &str) -> Result<Bytes> {
        let path = self.full_path(key);
        let response = self
            .bucket
            .get_object(&path)
            .await
            .map_err(|e| s3_error("download", &path, e))?;
        check_status(response.status_code(), "download", &path)?;

        Ok(Bytes::from(response.to_vec()))
    }

    async fn generate_download_signed_url(
        &self,
        key: &str,
        file_name: Option<&str>,
    ) -> Result<String> {
        let path = self.full_path(key);
        let queries = file_name.map(|name| {
            HashMap::from([(
                "response-content-disposition".to_string(),
                attachment_disposition(name),
            )])
        });

        self.bucket
            .presign_get(&path, Self::presign_secs(self.download_expiry), queries)
            .await
            .map_err(|e| s3_error("sign download URL for", &path, e))
    }

    async fn generate_upload_signed_url(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<SignedUpload> {
        let path = self.full_path(key);
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type).map_err(|_| {
                StorageError::Io(format!("Invalid content type: {}", content_type))
            })?,
        );

        let url = self
            .bucket
            .presign_put(&path, Self::presign_secs(self.upload_expiry), Some(headers), None)
            .await
            .map_err(|e| s3_error("sign upload URL for", &path, e))?;

        Ok(SignedUpload::url_only(url))
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        let path = self.full_path(key);
        // S3 answers 204 for missing keys, so check first.
        if !self.document_exists(key).await? {
            return Err(StorageError::not_found(path));
        }

        let response = self
            .bucket
            .delete_object(&path)
            .await
            .map_err(|e| s3_error("delete", &path, e))?;
        check_status(response.status_code(), "delete", &path)?;

        debug!("Deleted s3://{}/{}", self.bucket.name(), path);
        Ok(())
    }

    async fn document_exists(&self, key: &str) -> Result<bool> {
        let path = self.full_path(key);
        match self.bucket.head_object(&path).await {
            Ok((_, status)) => match check_status(status, "check", &path) {
                Ok(()) => Ok(true),
                Err(StorageError::NotFound { .. }) => Ok(false),
                Err(e) => Err(e),
            },
            Err(e) => Err(s3_error("check", &path, e)),
        }
    }

    async fn copy_file(&self, source_key: &str, destination_key: &str) -> Result<()> {
        let from = self.full_path(source_key);
        let to = self.full_path(destination_key);

        let status = self
            .bucket
            .copy_object_internal(&from, &to)
            .await
            .map_err(|e| s3_error("copy", &from, e))?;
        check_status(status, "copy", &from)?;

        debug!("Copied s3://{0}/{1} to s3://{0}/{2}", self.bucket.name(), from, to);
        Ok(())
    }

    async fn get_file_metadata(&self, key: &str) -> Result<ObjectMetadata> {
        let path = self.full_path(key);
        let (head, status) = self
            .bucket
            .head_object(&path)
            .await
            .map_err(|e| s3_error("read metadata of", &path, e))?;
        check_status(status, "read metadata of", &path)?;

        Ok(ObjectMetadata {
            size: head.content_length.unwrap_or(0).max(0) as u64,
            content_type: head.content_type,
            etag: head.e_tag,
            last_modified: head
                .last_modified
                .as_deref()
                .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
                .map(|d| d.with_timezone(&Utc)),
        })
    }

    async fn create_read_stream(&self, key: &str) -> Result<ByteStream> {
        let path = self.full_path(key);
        let response = self
            .bucket
            .get_object_stream(&path)
            .await
            .map_err(|e| s3_error("stream", &path, e))?;
        check_status(response.status_code, "stream", &path)?;

        let stream_path = path.clone();
        Ok(response
            .bytes
            .map(move |chunk| chunk.map_err(|e| s3_error("stream", &stream_path, e)))
            .boxed())
    }

    async fn create_write_stream(
        &self,
        _key: &str,
        _content_type: Option<&str>,
    ) -> Result<ObjectWriter> {
        Err(StorageError::unsupported(
            "create_write_stream",
            StorageProvider::AwsS3,
        ))
    }
}
