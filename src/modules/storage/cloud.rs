//! Storage adapter over an `object_store` client.
//!
//! Azure Blob Storage and Google Cloud Storage differ only in how their
//! client and signer are built (see `azure.rs` and `gcs.rs`); every contract
//! operation is the same call on the shared [`ObjectStore`] API.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, GetOptions, GetRange, ObjectStore, PutMultipartOpts, PutOptions,
    PutPayload, WriteMultipart,
};
use reqwest::Method;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::error::{Result, StorageError};
use super::provider::{
    ByteRange, ByteStream, ObjectMetadata, ObjectStorage, ObjectWriter, RawObject, SignedUpload,
    StorageProvider, DEFAULT_CONTENT_TYPE,
};
use super::stream_to_file;

/// Parts uploaded concurrently by a multipart writer
const MAX_CONCURRENT_PARTS: usize = 8;

/// Lifetimes and provider-specific headers for signed URLs
#[derive(Debug, Clone)]
pub(crate) struct SigningPolicy {
    pub download_expiry: Duration,
    pub upload_expiry: Duration,
    /// Headers the client must send with a signed PUT, besides `Content-Type`
    pub upload_headers: BTreeMap<String, String>,
}

pub struct CloudStorage {
    provider: StorageProvider,
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn Signer>,
    base_path: String,
    signing: SigningPolicy,
}

impl CloudStorage {
    pub(crate) fn new(
        provider: StorageProvider,
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn Signer>,
        base_path: String,
        signing: SigningPolicy,
    ) -> Self {
        Self {
            provider,
            store,
            signer,
            base_path,
            signing,
        }
    }

    fn location(&self, key: &str) -> ObjectPath {
        ObjectPath::from(self.full_path(key))
    }

    fn content_type_attributes(content_type: Option<&str>) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string().into(),
        );
        attributes
    }

    async fn multipart_writer(
        &self,
        location: &ObjectPath,
        content_type: Option<&str>,
    ) -> Result<WriteMultipart> {
        let upload = self
            .store
            .put_multipart_opts(
                location,
                PutMultipartOpts {
                    attributes: Self::content_type_attributes(content_type),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| StorageError::from_store(e, location))?;
        Ok(WriteMultipart::new(upload))
    }
}

/// Stream a `get` response, or a slice of it, as a [`ByteStream`].
async fn read_stream(
    store: &dyn ObjectStore,
    location: &ObjectPath,
    range: Option<ByteRange>,
) -> Result<ByteStream> {
    let options = GetOptions {
        range: range.map(get_range),
        ..Default::default()
    };
    let result = store
        .get_opts(location, options)
        .await
        .map_err(|e| StorageError::from_store(e, location))?;

    let path = location.to_string();
    Ok(result
        .into_stream()
        .map(move |chunk| chunk.map_err(|e| StorageError::from_store(e, &path)))
        .boxed())
}

async fn read_metadata(store: &dyn ObjectStore, location: &ObjectPath) -> Result<ObjectMetadata> {
    let result = store
        .get_opts(
            location,
            GetOptions {
                head: true,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| StorageError::from_store(e, location))?;

    Ok(ObjectMetadata {
        size: result.meta.size as u64,
        content_type: result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.as_ref().to_string()),
        etag: result.meta.e_tag.clone(),
        last_modified: Some(result.meta.last_modified),
    })
}

fn get_range(range: ByteRange) -> GetRange {
    let start = range.start as usize;
    match range.end {
        Some(end) => GetRange::Bounded(start..end as usize + 1),
        None => GetRange::Offset(start),
    }
}

#[async_trait]
impl ObjectStorage for CloudStorage {
    fn provider(&self) -> StorageProvider {
        self.provider
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    async fn upload_file(&self, source: &Path, destination_key: &str) -> Result<()> {
        let location = self.location(destination_key);
        let file = tokio::fs::File::open(source).await?;
        let mut writer = self.multipart_writer(&location, None).await?;

        let mut chunks = ReaderStream::new(file);
        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(e.into());
                }
            };
            writer
                .wait_for_capacity(MAX_CONCURRENT_PARTS)
                .await
                .map_err(|e| StorageError::from_store(e, &location))?;
            writer.put(chunk);
        }
        writer
            .finish()
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;

        debug!(
            "Uploaded {} to {} object {}",
            source.display(),
            self.provider,
            location
        );
        Ok(())
    }

    async fn upload_data(
        &self,
        destination_key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<()> {
        let location = self.location(destination_key);
        self.store
            .put_opts(
                &location,
                PutPayload::from(data),
                PutOptions {
                    attributes: Self::content_type_attributes(content_type),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;
        Ok(())
    }

    async fn download_document(&self, source_key: &str, destination: &Path) -> Result<()> {
        let stream = self.create_read_stream(source_key).await?;
        stream_to_file(stream, destination).await?;
        debug!(
            "Downloaded {} object {} to {}",
            self.provider,
            source_key,
            destination.display()
        );
        Ok(())
    }

    async fn get_data(&self, key: &str) -> Result<Bytes> {
        let location = self.location(key);
        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;
        result
            .bytes()
            .await
            .map_err(|e| StorageError::from_store(e, &location))
    }

    /// The client signers cannot fold response-header overrides into the
    /// signature, so a requested file name is refused instead of ignored.
    async fn generate_download_signed_url(
        &self,
        key: &str,
        file_name: Option<&str>,
    ) -> Result<String> {
        if file_name.is_some() {
            return Err(StorageError::unsupported(
                "download_url_with_file_name",
                self.provider,
            ));
        }

        let location = self.location(key);
        let url = self
            .signer
            .signed_url(Method::GET, &location, self.signing.download_expiry)
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;
        Ok(url.to_string())
    }

    async fn generate_upload_signed_url(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<SignedUpload> {
        let location = self.location(key);
        let url = self
            .signer
            .signed_url(Method::PUT, &location, self.signing.upload_expiry)
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;

        let mut headers = self.signing.upload_headers.clone();
        headers.insert(
            "Content-Type".to_string(),
            content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
        );
        Ok(SignedUpload {
            url: url.to_string(),
            headers,
        })
    }

    /// Some backends report success for absent objects; check first so a
    /// missing key is always `NotFound`.
    async fn delete_file(&self, key: &str) -> Result<()> {
        let location = self.location(key);
        self.store
            .head(&location)
            .await
            .map_err(|e| StorageError::from_store(e, &location))?;
        self.store
            .delete(&location)
            .await
            .map_err(|e| StorageError::from_store(e, &location))
    }

    async fn document_exists(&self, key: &str) -> Result<bool> {
        let location = self.location(key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::from_store(e, &location)),
        }
    }

    async fn copy_file(&self, source_key: &str, destination_key: &str) -> Result<()> {
        let source = self.location(source_key);
        let destination = self.location(destination_key);
        self.store
            .copy(&source, &destination)
            .await
            .map_err(|e| StorageError::from_store(e, &source))?;
        debug!("Copied {} object {} to {}", self.provider, source, destination);
        Ok(())
    }

    async fn get_file_metadata(&self, key: &str) -> Result<ObjectMetadata> {
        read_metadata(self.store.as_ref(), &self.location(key)).await
    }

    async fn create_read_stream(&self, key: &str) -> Result<ByteStream> {
        read_stream(self.store.as_ref(), &self.location(key), None).await
    }

    async fn create_write_stream(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<ObjectWriter> {
        let location = self.location(key);
        let mut writer = self.multipart_writer(&location, content_type).await?;

        Ok(ObjectWriter::spawn(move |mut parts| async move {
            while let Some(chunk) = parts.chunks.recv().await {
                if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
                    let _ = writer.abort().await;
                    return Err(StorageError::from_store(e, &location));
                }
                writer.put(chunk);
            }

            if parts.commit.await.is_err() {
                debug!("Write stream for {} dropped before finish", location);
                let _ = writer.abort().await;
                return Err(StorageError::Io(format!(
                    "Upload of '{}' was aborted",
                    location
                )));
            }

            writer
                .finish()
                .await
                .map_err(|e| StorageError::from_store(e, &location))?;
            Ok(())
        }))
    }

    fn raw_object(&self, key: &str) -> Result<Box<dyn RawObject>> {
        Ok(Box::new(CloudRawObject {
            store: self.store.clone(),
            location: self.location(key),
        }))
    }
}

struct CloudRawObject {
    store: Arc<dyn ObjectStore>,
    location: ObjectPath,
}

#[async_trait]
impl RawObject for CloudRawObject {
    async fn create_read_stream(&self, range: Option<ByteRange>) -> Result<ByteStream> {
        read_stream(self.store.as_ref(), &self.location, range).await
    }

    async fn metadata(&self) -> Result<ObjectMetadata> {
        read_metadata(self.store.as_ref(), &self.location).await
    }
}
