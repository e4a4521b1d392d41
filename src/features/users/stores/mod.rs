mod postgres;

#[cfg(test)]
mod memory;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::users::models::{NewIdentity, NewUser, User, UserIdentity, UserPatch};

#[cfg(test)]
pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// Persistence for accounts and their sign-in identities.
///
/// Implementations only ever see live rows; soft-deleted users and
/// identities behave as if they did not exist. Unique violations on
/// `(provider, provider_id)` or the account email surface as
/// [`AppError::DuplicateUser`](crate::core::error::AppError::DuplicateUser).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_identity(&self, provider: &str, provider_id: &str)
        -> Result<Option<UserIdentity>>;

    async fn list_identities(&self, user_id: Uuid) -> Result<Vec<UserIdentity>>;

    /// Create an account together with its first identity, atomically.
    async fn create_user(&self, user: NewUser, identity: NewIdentity) -> Result<User>;

    async fn link_identity(&self, user_id: Uuid, identity: NewIdentity) -> Result<UserIdentity>;

    async fn update_identity_metadata(&self, identity_id: Uuid, metadata: Value) -> Result<()>;

    /// `None` when the account does not exist.
    async fn update_user(&self, user_id: Uuid, patch: UserPatch) -> Result<Option<User>>;

    /// Soft-delete every live `(user_id, provider)` identity; returns how many.
    async fn soft_delete_identities(&self, user_id: Uuid, provider: &str) -> Result<u64>;
}
