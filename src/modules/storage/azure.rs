//! Azure Blob Storage adapter.
//!
//! Authenticates with an Entra ID client secret and signs URLs with
//! user-delegation SAS, so no account key is ever configured.

use object_store::azure::MicrosoftAzureBuilder;
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

/// Build the adapter from configuration. Fails on the first missing setting,
/// checked in the order account, client id, tenant id, client secret, bucket.
pub fn connect(config: &StorageConfig) -> Result<CloudStorage> {
    let azure = &config.azure;
    let account = required(&azure.account_name, "AZURE_STORAGE_ACCOUNT_NAME")?;
    let client_id = required(&azure.client_id, "AZURE_CLIENT_ID")?;
    let tenant_id = required(&azure.tenant_id, "AZURE_TENANT_ID")?;
    let client_secret = required(&azure.client_secret, "AZURE_CLIENT_SECRET")?;
    let container = required(&config.bucket_name, "BUCKET_NAME")?;

    let mut builder = MicrosoftAzureBuilder::new()
        .with_account(account)
        .with_container_name(container)
        .with_client_id(client_id)
        .with_client_secret(client_secret)
        .with_tenant_id(tenant_id)
        .with_allow_http(azure.allow_http);
    if let Some(endpoint) = azure.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        builder = builder.with_endpoint(endpoint.to_string());
    }
    if let Some(host) = azure.authority_host.as_deref().filter(|h| !h.trim().is_empty()) {
        builder = builder.with_authority_host(host.trim_end_matches('/'));
    }

    let client = Arc::new(builder.build().map_err(|e| {
        StorageError::Configuration(format!("Invalid Azure storage configuration: {}", e))
    })?);

    info!(
        "Azure Blob storage initialized for account: {}, container: {}",
        account, container
    );

    Ok(CloudStorage::new(
        StorageProvider::AzureBlobStorage,
        client.clone(),
        client,
        config.base_path.clone(),
        SigningPolicy {
            download_expiry: signed_url_expiry(
                config.download_url_expiry_secs,
                DEFAULT_DOWNLOAD_EXPIRY,
            ),
            upload_expiry: signed_url_expiry(config.upload_url_expiry_secs, DEFAULT_UPLOAD_EXPIRY),
            upload_headers: BTreeMap::from([(
                "x-ms-blob-type".to_string(),
                "BlockBlob".to_string(),
            )]),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AzureConfig;
    use crate::modules::storage::ObjectStorage;
    use crate::shared::test_helpers::MockEntra;

    fn full_config() -> StorageConfig {
        StorageConfig {
            bucket_name: Some("documents".to_string()),
            base_path: "tenant".to_string(),
            azure: AzureConfig {
                account_name: Some("devstoreaccount1".to_string()),
                client_id: Some("client".to_string()),
                tenant_id: Some("tenant-id".to_string()),
                client_secret: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_connect_reports_first_missing_setting_in_order() {
        let cases: [(fn(&mut StorageConfig), &str); 5] = [
            (|c| c.azure.account_name = None, "AZURE_STORAGE_ACCOUNT_NAME is required"),
            (|c| c.azure.client_id = None, "AZURE_CLIENT_ID is required"),
            (|c| c.azure.tenant_id = None, "AZURE_TENANT_ID is required"),
            (|c| c.azure.client_secret = None, "AZURE_CLIENT_SECRET is required"),
            (|c| c.bucket_name = Some(String::new()), "BUCKET_NAME is required"),
        ];

        for (mutate, expected) in cases {
            let mut config = full_config();
            mutate(&mut config);
            let err = connect(&config).err().expect("construction must fail");
            assert_eq!(err.to_string(), expected);
        }

        // Credentials are checked before the bucket.
        let mut config = full_config();
        config.bucket_name = None;
        config.azure.client_id = None;
        let err = connect(&config).err().unwrap();
        assert_eq!(err.to_string(), "AZURE_CLIENT_ID is required");
    }

    #[test]
    fn test_connect_with_defaults() {
        let storage = connect(&full_config()).unwrap();
        assert_eq!(storage.provider(), StorageProvider::AzureBlobStorage);
        assert_eq!(storage.full_path("/docs/a.pdf"), "tenant/docs/a.pdf");
    }

    #[tokio::test]
    async fn test_signed_urls_use_user_delegation_sas() {
        let mock = MockEntra::start().await;
        let mut config = full_config();
        config.azure.endpoint = Some(mock.blob_endpoint());
        config.azure.authority_host = Some(mock.authority_host());
        config.azure.allow_http = true;
        let storage = connect(&config).unwrap();

        let download = storage
            .generate_download_signed_url("docs/a.pdf", None)
            .await
            .unwrap();
        assert!(
            download.starts_with(&format!("{}/documents/tenant/docs/a.pdf?", mock.blob_endpoint())),
            "{}",
            download
        );
        for field in ["sr=b", "skoid=", "sig="] {
            assert!(download.contains(field), "missing {} in {}", field, download);
        }

        let upload = storage
            .generate_upload_signed_url("docs/a.pdf", None)
            .await
            .unwrap();
        assert!(upload.url.contains("sig="));
        assert_eq!(
            upload.headers.get("x-ms-blob-type").map(String::as_str),
            Some("BlockBlob")
        );
        assert_eq!(
            upload.headers.get("Content-Type").map(String::as_str),
            Some("application/octet-stream")
        );

        // The bearer token is cached across signing requests.
        assert_eq!(mock.token_requests(), 1);
    }
}
