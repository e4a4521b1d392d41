use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Mutex;
use uuid::Uuid;

use super::IdentityStore;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{NewIdentity, NewUser, User, UserIdentity, UserPatch};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    identities: Vec<UserIdentity>,
}

/// In-memory [`IdentityStore`] with the same live-row and uniqueness rules
/// as the database.
#[derive(Default)]
pub struct MemoryIdentityStore {
    tables: Mutex<Tables>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every identity row, soft-deleted ones included.
    pub fn all_identities(&self) -> Vec<UserIdentity> {
        self.tables.lock().unwrap().identities.clone()
    }

    /// Soft-delete an account directly.
    pub fn delete_user(&self, user_id: Uuid) {
        let mut tables = self.tables.lock().unwrap();
        for user in tables.users.iter_mut().filter(|u| u.id == user_id) {
            user.is_deleted = true;
        }
    }
}

fn duplicate() -> AppError {
    AppError::DuplicateUser("An account with this email or sign-in identity already exists".into())
}

impl Tables {
    fn live_identity(&self, provider: &str, provider_id: &str) -> Option<&UserIdentity> {
        self.identities
            .iter()
            .find(|i| !i.is_deleted && i.provider == provider && i.provider_id == provider_id)
    }

    fn insert_identity(&mut self, user_id: Uuid, identity: NewIdentity) -> Result<UserIdentity> {
        if self
            .live_identity(&identity.provider, &identity.provider_id)
            .is_some()
        {
            return Err(duplicate());
        }

        let now = Utc::now();
        let row = UserIdentity {
            id: Uuid::now_v7(),
            user_id,
            provider: identity.provider,
            provider_id: identity.provider_id,
            metadata: identity.metadata,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.identities.push(row.clone());
        Ok(row)
    }
}

fn apply_patch(user: &mut User, patch: UserPatch) {
    if let Some(value) = patch.name {
        user.name = Some(value);
    }
    if let Some(value) = patch.gender {
        user.gender = Some(value);
    }
    if let Some(value) = patch.age {
        user.age = Some(value);
    }
    if let Some(value) = patch.dob {
        user.dob = Some(value);
    }
    if let Some(value) = patch.job_role {
        user.job_role = Some(value);
    }
    if let Some(value) = patch.city {
        user.city = Some(value);
    }
    if let Some(value) = patch.work_duration {
        user.work_duration = Some(value);
    }
    if let Some(value) = patch.distance {
        user.distance = Some(value);
    }
    if let Some(value) = patch.job_type {
        user.job_type = Some(value);
    }
    if let Some(value) = patch.salary {
        user.salary = Some(value);
    }
    if let Some(value) = patch.company {
        user.company = Some(value);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| !u.is_deleted && u.id == user_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| !u.is_deleted && u.email == email)
            .cloned())
    }

    async fn find_identity(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserIdentity>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.live_identity(provider, provider_id).cloned())
    }

    async fn list_identities(&self, user_id: Uuid) -> Result<Vec<UserIdentity>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .identities
            .iter()
            .filter(|i| !i.is_deleted && i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser, identity: NewIdentity) -> Result<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| !u.is_deleted && u.email == user.email)
            || tables
                .live_identity(&identity.provider, &identity.provider_id)
                .is_some()
        {
            return Err(duplicate());
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::now_v7(),
            email: user.email,
            name: user.name,
            gender: user.gender,
            age: user.age,
            dob: user.dob,
            job_role: None,
            city: None,
            work_duration: None,
            distance: None,
            job_type: None,
            salary: None,
            company: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        tables.insert_identity(created.id, identity)?;
        Ok(created)
    }

    async fn link_identity(&self, user_id: Uuid, identity: NewIdentity) -> Result<UserIdentity> {
        self.tables
            .lock()
            .unwrap()
            .insert_identity(user_id, identity)
    }

    async fn update_identity_metadata(&self, identity_id: Uuid, metadata: Value) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(identity) = tables
            .identities
            .iter_mut()
            .find(|i| !i.is_deleted && i.id == identity_id)
        {
            identity.metadata = Some(metadata);
            identity.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_user(&self, user_id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| !u.is_deleted && u.id == user_id)
        else {
            return Ok(None);
        };

        if !patch.is_empty() {
            apply_patch(user, patch);
            user.updated_at = Utc::now();
        }
        Ok(Some(user.clone()))
    }

    async fn soft_delete_identities(&self, user_id: Uuid, provider: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let mut affected = 0;
        for identity in tables
            .identities
            .iter_mut()
            .filter(|i| !i.is_deleted && i.user_id == user_id && i.provider == provider)
        {
            identity.is_deleted = true;
            identity.updated_at = Utc::now();
            affected += 1;
        }
        Ok(affected)
    }
}
