//! Provider resolution and per-provider adapter memoization.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::error::{Result, StorageError};
use super::provider::{InfraProvider, ObjectStorage, StorageProvider};
use super::s3::AwsS3Storage;
use super::{azure, gcs};
use crate::core::config::StorageConfig;

/// Builds one adapter from configuration.
pub type StorageBuilder =
    Box<dyn Fn(&StorageConfig) -> Result<Arc<dyn ObjectStorage>> + Send + Sync>;

struct Registration {
    builder: StorageBuilder,
    instance: OnceCell<Arc<dyn ObjectStorage>>,
}

/// Registry of storage adapters keyed by provider.
///
/// Each adapter is built on first use and shared afterwards. Concurrent first
/// requests for the same provider build it once; a failed build is not
/// remembered, so the next request tries again.
pub struct StorageFactory {
    config: StorageConfig,
    registry: HashMap<StorageProvider, Registration>,
}

impl StorageFactory {
    /// Factory with the built-in S3, Azure and GCS adapters registered.
    pub fn new(config: StorageConfig) -> Self {
        let mut factory = Self::empty(config);
        factory.register(
            StorageProvider::AwsS3,
            Box::new(|c: &StorageConfig| -> Result<Arc<dyn ObjectStorage>> {
                Ok(Arc::new(AwsS3Storage::new(c)?))
            }),
        );
        factory.register(
            StorageProvider::AzureBlobStorage,
            Box::new(|c: &StorageConfig| -> Result<Arc<dyn ObjectStorage>> {
                Ok(Arc::new(azure::connect(c)?))
            }),
        );
        factory.register(
            StorageProvider::GoogleCloudStorage,
            Box::new(|c: &StorageConfig| -> Result<Arc<dyn ObjectStorage>> {
                Ok(Arc::new(gcs::connect(c)?))
            }),
        );
        factory
    }

    /// Factory with no adapters registered.
    pub fn empty(config: StorageConfig) -> Self {
        Self {
            config,
            registry: HashMap::new(),
        }
    }

    /// Register (or replace) the builder for `provider`.
    pub fn register(&mut self, provider: StorageProvider, builder: StorageBuilder) {
        self.registry.insert(
            provider,
            Registration {
                builder,
                instance: OnceCell::new(),
            },
        );
    }

    /// The explicit provider when given, otherwise the default for the
    /// configured `INFRA_PROVIDER`.
    pub fn resolve_provider(&self, explicit: Option<StorageProvider>) -> Result<StorageProvider> {
        if let Some(provider) = explicit {
            return Ok(provider);
        }

        let infra = self
            .config
            .infra_provider
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                StorageError::Configuration(
                    "INFRA_PROVIDER is required when no storage provider is given".to_string(),
                )
            })?;

        Ok(infra.parse::<InfraProvider>()?.default_storage())
    }

    /// Shared adapter for the resolved provider, built on first use.
    pub async fn get_instance(
        &self,
        explicit: Option<StorageProvider>,
    ) -> Result<Arc<dyn ObjectStorage>> {
        let provider = self.resolve_provider(explicit)?;
        let registration = self.registry.get(&provider).ok_or_else(|| {
            StorageError::UnknownProvider {
                kind: "storage provider",
                name: provider.to_string(),
            }
        })?;

        let instance = registration
            .instance
            .get_or_try_init(|| async {
                tracing::debug!("Creating {} storage adapter", provider);
                (registration.builder)(&self.config)
            })
            .await?;

        Ok(instance.clone())
    }
}
