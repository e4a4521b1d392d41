use thiserror::Error;

use super::provider::StorageProvider;

/// Errors raised by the storage layer.
///
/// Construction-time problems (`Configuration`, `UnknownProvider`) abort
/// adapter creation before any network call. Everything else is a runtime
/// failure that is surfaced to the caller as is; this layer never retries.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Configuration(String),

    #[error("Unknown {kind}: {name}")]
    UnknownProvider { kind: &'static str, name: String },

    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("{operation} is not supported by {provider}")]
    Unsupported {
        operation: &'static str,
        provider: StorageProvider,
    },

    #[error("Storage I/O error: {0}")]
    Io(String),
}

impl StorageError {
    pub fn not_found(key: impl Into<String>) -> Self {
        StorageError::NotFound { key: key.into() }
    }

    pub fn unsupported(operation: &'static str, provider: StorageProvider) -> Self {
        StorageError::Unsupported {
            operation,
            provider,
        }
    }

    /// Map a client error for `path`; a missing object keeps its own variant.
    pub(crate) fn from_store(err: object_store::Error, path: impl std::fmt::Display) -> Self {
        match err {
            object_store::Error::NotFound { .. } => StorageError::not_found(path.to_string()),
            other => StorageError::Io(format!("'{}': {}", path, other)),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Returns the setting value, or a configuration error naming the variable
/// when it is unset or blank.
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorageError::Configuration(format!("{} is required", name))),
    }
}
