//! File operations over the configured object storage backends.
//!
//! Every endpoint accepts an optional `provider` (`AWSS3`,
//! `AzureBlobStorage`, `GoogleCloudStorage`); without one the backend mapped
//! from `INFRA_PROVIDER` is used. Keys sent by a user are confined to
//! `users/<id>/`; service callers address the bucket directly.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
