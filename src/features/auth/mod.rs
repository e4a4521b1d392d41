//! Sign-in flows over [`UserService`](crate::features::users::UserService).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/auth/register` | Email + password sign-up |
//! | POST | `/api/auth/login` | Email + password login |
//! | POST | `/api/auth/phone` | Phone sign-in (find or create), service token required |
//! | POST | `/api/auth/oauth` | OAuth profile sign-in (find, link or create), service token required |
//!
//! Phone and OAuth sign-in trust the identity in the request body, so only a
//! backend caller holding the `service` role may use them. Every other
//! protected route reads the caller from the bearer token checked by
//! [`auth_middleware`](crate::core::middleware::auth_middleware).

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod validator;

pub use model::AuthenticatedUser;
pub use validator::JwtValidator;
