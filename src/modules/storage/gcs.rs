//! Google Cloud Storage adapter.
//!
//! Authenticates with a service-account key, which also signs V4 URLs
//! offline.

use object_store::gcp::GoogleCloudStorageBuilder;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::cloud::{CloudStorage, SigningPolicy};
use super::error::{required, Result, StorageError};
use super::provider::StorageProvider;
use super::signed_url_expiry;
use crate::core::config::StorageConfig;

const DEFAULT_DOWNLOAD_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_UPLOAD_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Build the adapter from configuration: the service-account JSON must be
/// present and parseable, then the bucket must be set.
pub fn connect(config: &StorageConfig) -> Result<CloudStorage> {
    let credentials_json = required(
        &config.gcs.credentials_json,
        "GOOGLE_CLOUD_APPLICATION_CREDENTIALS",
    )?;
    let mut key: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(credentials_json).map_err(|e| {
            StorageError::Configuration(format!(
                "GOOGLE_CLOUD_APPLICATION_CREDENTIALS is not a valid service account key: {}",
                e
            ))
        })?;
    let bucket = required(&config.bucket_name, "BUCKET_NAME")?;

    // The client reads its endpoint override from the key itself.
    if let Some(endpoint) = config.gcs.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        key.insert(
            "gcs_base_url".to_string(),
            endpoint.trim_end_matches('/').into(),
        );
    }
    let client_email = key
        .get("client_email")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let client = Arc::new(
        GoogleCloudStorageBuilder::new()
            .with_service_account_key(serde_json::Value::Object(key).to_string())
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| {
                StorageError::Configuration(format!(
                    "GOOGLE_CLOUD_APPLICATION_CREDENTIALS is not a valid service account key: {}",
                    e
                ))
            })?,
    );

    info!(
        "Google Cloud Storage initialized for bucket: {} as {}",
        bucket, client_email
    );

    Ok(CloudStorage::new(
        StorageProvider::GoogleCloudStorage,
        client.clone(),
        client,
        config.base_path.clone(),
        SigningPolicy {
            download_expiry: signed_url_expiry(
                config.download_url_expiry_secs,
                DEFAULT_DOWNLOAD_EXPIRY,
            ),
            upload_expiry: signed_url_expiry(config.upload_url_expiry_secs, DEFAULT_UPLOAD_EXPIRY),
            upload_headers: BTreeMap::new(),
        },
    ))
}
