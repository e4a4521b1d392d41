//! Object storage abstraction
//!
//! One capability contract ([`ObjectStorage`]) with adapters for AWS S3,
//! Azure Blob Storage and Google Cloud Storage, plus a [`StorageFactory`]
//! that resolves and memoizes adapters per provider.

mod azure;
mod cloud;
mod error;
mod factory;
mod gcs;
mod path;
mod provider;
mod s3;

use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub use error::{Result, StorageError};
pub use factory::StorageFactory;
pub(crate) use provider::ByteStream;
pub use provider::{ObjectMetadata, ObjectStorage, SignedUpload, StorageProvider};
#[cfg(test)]
pub use provider::{ByteRange, ObjectWriter, RawObject};

/// Longest lifetime any backend accepts for a signed URL
pub const MAX_SIGNED_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetime for a signed URL: the configured override when present,
/// otherwise the backend default, never beyond seven days.
pub(crate) fn signed_url_expiry(override_secs: Option<u64>, default: Duration) -> Duration {
    override_secs
        .map(Duration::from_secs)
        .unwrap_or(default)
        .min(MAX_SIGNED_URL_EXPIRY)
}

/// Drain `stream` into a new file at `destination`, removing the partial file
/// on failure.
pub(crate) async fn stream_to_file(mut stream: ByteStream, destination: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(destination).await?;

    let mut outcome = Ok(());
    while let Some(chunk) = stream.next().await {
        let written = match chunk {
            Ok(bytes) => file.write_all(&bytes).await.map_err(StorageError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            outcome = Err(e);
            break;
        }
    }
    if outcome.is_ok() {
        outcome = file.flush().await.map_err(StorageError::from);
    }

    if outcome.is_err() {
        drop(file);
        let _ = tokio::fs::remove_file(destination).await;
    }
    outcome
}
