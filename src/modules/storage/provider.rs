//! Storage provider contract shared by every cloud backend.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use super::error::{Result, StorageError};
use super::path::resolve_full_path;

/// Storage backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum StorageProvider {
    #[serde(rename = "GoogleCloudStorage")]
    GoogleCloudStorage,
    #[serde(rename = "AWSS3")]
    AwsS3,
    #[serde(rename = "AzureBlobStorage")]
    AzureBlobStorage,
}

impl StorageProvider {
    pub const ALL: [StorageProvider; 3] = [
        StorageProvider::GoogleCloudStorage,
        StorageProvider::AwsS3,
        StorageProvider::AzureBlobStorage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::GoogleCloudStorage => "GoogleCloudStorage",
            StorageProvider::AwsS3 => "AWSS3",
            StorageProvider::AzureBlobStorage => "AzureBlobStorage",
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageProvider {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        StorageProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| StorageError::UnknownProvider {
                kind: "storage provider",
                name: s.to_string(),
            })
    }
}

/// Deployment-level infrastructure hint used to pick a default backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfraProvider {
    Gcp,
    Aws,
    Azure,
}

impl InfraProvider {
    pub fn default_storage(&self) -> StorageProvider {
        match self {
            InfraProvider::Gcp => StorageProvider::GoogleCloudStorage,
            InfraProvider::Aws => StorageProvider::AwsS3,
            InfraProvider::Azure => StorageProvider::AzureBlobStorage,
        }
    }
}

impl FromStr for InfraProvider {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GCP" => Ok(InfraProvider::Gcp),
            "AWS" => Ok(InfraProvider::Aws),
            "Azure" => Ok(InfraProvider::Azure),
            other => Err(StorageError::UnknownProvider {
                kind: "infra provider",
                name: other.to_string(),
            }),
        }
    }
}

/// Object metadata as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Object size in bytes
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectMetadata {
    pub fn with_size(size: u64) -> Self {
        Self {
            size,
            content_type: None,
            etag: None,
            last_modified: None,
        }
    }
}

/// Time-limited write URL plus any headers the client must send with its PUT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignedUpload {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl SignedUpload {
    pub fn url_only(url: String) -> Self {
        Self {
            url,
            headers: BTreeMap::new(),
        }
    }
}

/// Inclusive byte range for partial reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end offset; `None` reads to the end of the object
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// `Range`-style header value, e.g. `bytes=0-99`
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Incremental object content
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Default content type applied when a caller does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of chunks an [`ObjectWriter`] buffers ahead of the upload task
const WRITE_BUFFER_CHUNKS: usize = 8;

/// Receiving half of an [`ObjectWriter`], consumed by a backend upload task.
pub(crate) struct WriteStreamParts {
    pub chunks: mpsc::Receiver<Bytes>,
    pub commit: oneshot::Receiver<()>,
}

impl WriteStreamParts {
    /// Turn the chunk channel into a request body stream. The stream errors
    /// out instead of ending cleanly when the writer was dropped without
    /// `finish`, so the backend never stores a truncated object.
    pub fn into_body_stream(self) -> BoxStream<'static, std::io::Result<Bytes>> {
        let WriteStreamParts { chunks, commit } = self;
        let trailer = stream::once(async move {
            match commit.await {
                Ok(()) => None,
                Err(_) => Some(Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "write stream dropped before finish",
                ))),
            }
        })
        .filter_map(|item| async move { item });

        ReceiverStream::new(chunks).map(Ok).chain(trailer).boxed()
    }
}

/// Incremental object writer returned by `create_write_stream`.
///
/// Chunks are forwarded to a background upload task; `finish` commits the
/// object and reports the upload result. Dropping the writer without calling
/// `finish` abandons the upload.
pub struct ObjectWriter {
    chunks: Option<mpsc::Sender<Bytes>>,
    commit: Option<oneshot::Sender<()>>,
    upload: Option<JoinHandle<Result<()>>>,
}

impl ObjectWriter {
    pub(crate) fn spawn<F, Fut>(upload: F) -> Self
    where
        F: FnOnce(WriteStreamParts) -> Fut,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let (chunk_tx, chunk_rx) = mpsc::channel(WRITE_BUFFER_CHUNKS);
        let (commit_tx, commit_rx) = oneshot::channel();
        let handle = tokio::spawn(upload(WriteStreamParts {
            chunks: chunk_rx,
            commit: commit_rx,
        }));

        Self {
            chunks: Some(chunk_tx),
            commit: Some(commit_tx),
            upload: Some(handle),
        }
    }

    /// Queue a chunk for upload.
    pub async fn write(&mut self, chunk: impl Into<Bytes>) -> Result<()> {
        let sender = self
            .chunks
            .as_ref()
            .ok_or_else(|| StorageError::Io("write stream is closed".to_string()))?;

        if sender.send(chunk.into()).await.is_ok() {
            return Ok(());
        }

        // The upload task stopped reading; report why.
        self.chunks = None;
        match self.upload.take() {
            Some(handle) => match join_upload(handle).await {
                Err(e) => Err(e),
                Ok(()) => Err(StorageError::Io(
                    "upload finished before the write stream was closed".to_string(),
                )),
            },
            None => Err(StorageError::Io("write stream is closed".to_string())),
        }
    }

    /// Close the stream, commit the object and wait for the upload to settle.
    pub async fn finish(mut self) -> Result<()> {
        if let Some(commit) = self.commit.take() {
            let _ = commit.send(());
        }
        self.chunks = None;

        match self.upload.take() {
            Some(handle) => join_upload(handle).await,
            None => Err(StorageError::Io("write stream was aborted".to_string())),
        }
    }
}

async fn join_upload(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle
        .await
        .map_err(|e| StorageError::Io(format!("upload task failed: {}", e)))?
}

/// Range-capable accessor for a single object.
///
/// Every `create_read_stream` call issues a fresh request, so a consumer can
/// restart a read from any offset.
#[async_trait]
pub trait RawObject: Send + Sync {
    async fn create_read_stream(&self, range: Option<ByteRange>) -> Result<ByteStream>;

    async fn metadata(&self) -> Result<ObjectMetadata>;
}

/// Capability contract every storage backend satisfies.
///
/// Keys are caller-relative; each adapter resolves them against its own base
/// path with [`resolve_full_path`] before touching the backend. Adapters own
/// their vendor clients exclusively and are shared across requests once
/// constructed, hence `Send + Sync`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn provider(&self) -> StorageProvider;

    fn base_path(&self) -> &str;

    fn full_path(&self, key: &str) -> String {
        resolve_full_path(self.base_path(), key)
    }

    /// Stream a local file to `destination_key`.
    async fn upload_file(&self, source: &Path, destination_key: &str) -> Result<()>;

    async fn upload_data(
        &self,
        destination_key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<()>;

    /// Stream `source_key` into a local file.
    async fn download_document(&self, source_key: &str, destination: &Path) -> Result<()>;

    async fn get_data(&self, key: &str) -> Result<Bytes>;

    /// Time-limited read URL; `file_name` forces an attachment disposition.
    async fn generate_download_signed_url(
        &self,
        key: &str,
        file_name: Option<&str>,
    ) -> Result<String>;

    /// Time-limited write URL bound to `content_type`.
    async fn generate_upload_signed_url(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<SignedUpload>;

    async fn delete_file(&self, key: &str) -> Result<()>;

    async fn document_exists(&self, key: &str) -> Result<bool>;

    /// Server-side copy within the configured bucket.
    async fn copy_file(&self, source_key: &str, destination_key: &str) -> Result<()>;

    async fn get_file_metadata(&self, key: &str) -> Result<ObjectMetadata>;

    async fn create_read_stream(&self, key: &str) -> Result<ByteStream>;

    async fn create_write_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<ObjectWriter>;

    /// Low-level accessor supporting byte-range reads.
    fn raw_object(&self, _key: &str) -> Result<Box<dyn RawObject>> {
        Err(StorageError::unsupported("raw_object", self.provider()))
    }
}

/// Content-Disposition value forcing a browser download with `file_name`
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', "'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_parse_and_display() {
        for provider in StorageProvider::ALL {
            assert_eq!(provider.as_str().parse::<StorageProvider>().unwrap(), provider);
        }
        assert_eq!(StorageProvider::AwsS3.to_string(), "AWSS3");

        let err = "Dropbox".parse::<StorageProvider>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown storage provider: Dropbox");
    }

    #[test]
    fn test_storage_provider_serde_uses_wire_names() {
        let json = serde_json::to_string(&StorageProvider::AwsS3).unwrap();
        assert_eq!(json, "\"AWSS3\"");
        let parsed: StorageProvider = serde_json::from_str("\"AzureBlobStorage\"").unwrap();
        assert_eq!(parsed, StorageProvider::AzureBlobStorage);
    }

    #[test]
    fn test_infra_provider_default_mapping() {
        let cases = [
            ("GCP", StorageProvider::GoogleCloudStorage),
            ("AWS", StorageProvider::AwsS3),
            ("Azure", StorageProvider::AzureBlobStorage),
        ];
        for (name, expected) in cases {
            let infra: InfraProvider = name.parse().unwrap();
            assert_eq!(infra.default_storage(), expected);
        }

        let err = "gcp".parse::<InfraProvider>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown infra provider: gcp");
    }

    #[test]
    fn test_byte_range_header_value() {
        assert_eq!(ByteRange::new(0, Some(99)).header_value(), "bytes=0-99");
        assert_eq!(ByteRange::new(10, None).header_value(), "bytes=10-");
    }

    #[test]
    fn test_signed_upload_omits_empty_headers() {
        let json = serde_json::to_value(SignedUpload::url_only("https://x".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "url": "https://x" }));
    }

    #[tokio::test]
    async fn test_object_writer_delivers_chunks_and_commits() {
        let (tx, rx) = oneshot::channel::<Vec<u8>>();
        let mut writer = ObjectWriter::spawn(|parts| async move {
            let mut body = parts.into_body_stream();
            let mut collected = Vec::new();
            while let Some(chunk) = body.next().await {
                collected.extend_from_slice(&chunk?);
            }
            let _ = tx.send(collected);
            Ok(())
        });

        writer.write(Bytes::from_static(b"hello ")).await.unwrap();
        writer.write(b"world".to_vec()).await.unwrap();
        writer.finish().await.unwrap();

        assert_eq!(rx.await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_object_writer_dropped_without_finish_fails_body() {
        let (tx, rx) = oneshot::channel::<bool>();
        let mut writer = ObjectWriter::spawn(|parts| async move {
            let mut body = parts.into_body_stream();
            let mut failed = false;
            while let Some(chunk) = body.next().await {
                if chunk.is_err() {
                    failed = true;
                }
            }
            let _ = tx.send(failed);
            Ok(())
        });

        writer.write(Bytes::from_static(b"partial")).await.unwrap();
        drop(writer);

        assert!(rx.await.unwrap());
    }

    #[tokio::test]
    async fn test_object_writer_surfaces_upload_error() {
        let mut writer = ObjectWriter::spawn(|_parts| async move {
            Err(StorageError::Io("backend rejected upload".to_string()))
        });

        // Give the task a chance to exit and drop its receiver.
        tokio::task::yield_now().await;
        let mut result = Ok(());
        for _ in 0..32 {
            result = writer.write(Bytes::from_static(b"x")).await;
            if result.is_err() {
                break;
            }
        }
        let err = result.unwrap_err();
        assert!(err.to_string().contains("backend rejected upload"));
    }
}
