//! Accounts and their sign-in identities.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/{id}` | Get account |
//! | PATCH | `/api/users/{id}` | Update profile and assessment fields |
//! | GET | `/api/users/{id}/identities` | List linked identities |
//! | DELETE | `/api/users/{id}/identities/{provider}` | Unlink a provider |
//!
//! Every endpoint requires a bearer token for the account itself or a
//! service token.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::UserService;
pub use stores::PgIdentityStore;
