use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{
    merge_metadata, metadata_object, NewIdentity, NewUser, User, UserIdentity, UserPatch,
};
use crate::features::users::stores::IdentityStore;
use crate::shared::constants::{
    META_EMAIL_VERIFIED, META_LAST_LOGIN_AT, META_PASSWORD_HASH, META_PHONE, META_PHONE_VERIFIED,
    META_REGISTERED_AT, PHONE_PLACEHOLDER_DOMAIN, PROVIDER_EMAIL_PASSWORD, PROVIDER_PHONE_OTP,
};
use crate::shared::validation::phone_digits;

/// A verified profile handed over by an external identity provider
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
    pub raw_profile: Option<Value>,
}

/// Input for email + password sign-up
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub dob: Option<NaiveDate>,
}

/// Accounts and the identities used to sign in to them
pub struct UserService {
    store: Arc<dyn IdentityStore>,
    password_params: Params,
}

impl UserService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self {
            store,
            password_params: Params::default(),
        }
    }

    /// Override the Argon2 cost parameters used for new password hashes.
    pub fn with_password_params(mut self, params: Params) -> Self {
        self.password_params = params;
        self
    }

    /// Sign in through an external provider.
    ///
    /// A known `(provider, provider_id)` returns its account, merging
    /// `metadata` into what is stored. Otherwise the identity is linked to the
    /// account owning `profile.email`, or a new account is created.
    pub async fn find_or_create_user(
        &self,
        profile: OAuthProfile,
        metadata: Option<Value>,
    ) -> Result<User> {
        if let Some(identity) = self
            .store
            .find_identity(&profile.provider, &profile.provider_id)
            .await?
        {
            if let Some(metadata) = metadata {
                let merged = merge_metadata(identity.metadata.clone(), metadata);
                self.store
                    .update_identity_metadata(identity.id, merged)
                    .await?;
            }
            return self.owner_of(&identity).await;
        }

        let metadata = metadata.or(profile.raw_profile);

        if let Some(user) = self.store.find_user_by_email(&profile.email).await? {
            self.store
                .link_identity(
                    user.id,
                    NewIdentity::new(&profile.provider, profile.provider_id, metadata),
                )
                .await?;
            tracing::info!("Linked {} identity to user {}", profile.provider, user.id);
            return Ok(user);
        }

        let user = self
            .store
            .create_user(
                NewUser::new(profile.email, profile.name),
                NewIdentity::new(&profile.provider, profile.provider_id, metadata),
            )
            .await?;
        tracing::info!("Created user {} via {}", user.id, profile.provider);
        Ok(user)
    }

    pub async fn register_with_email_password(&self, registration: Registration) -> Result<User> {
        if self
            .store
            .find_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(email_taken());
        }

        let password_hash = self.hash_password(registration.password).await?;
        let metadata = metadata_object([
            (META_PASSWORD_HASH, json!(password_hash)),
            (META_EMAIL_VERIFIED, json!(false)),
            (META_REGISTERED_AT, json!(timestamp())),
        ]);

        let new_user = NewUser {
            email: registration.email.clone(),
            name: registration.name,
            gender: registration.gender,
            age: registration.age,
            dob: registration.dob,
        };
        let identity = NewIdentity::new(
            PROVIDER_EMAIL_PASSWORD,
            registration.email,
            Some(metadata),
        );

        let user = self
            .store
            .create_user(new_user, identity)
            .await
            .map_err(|e| match e {
                AppError::DuplicateUser(_) => email_taken(),
                other => other,
            })?;
        tracing::info!("Registered user {} with email and password", user.id);
        Ok(user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn authenticate_with_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let identity = self
            .store
            .find_identity(PROVIDER_EMAIL_PASSWORD, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hash = identity
            .metadata_str(META_PASSWORD_HASH)
            .ok_or(AppError::InvalidCredentials)?
            .to_string();
        if !verify_password(password.to_string(), hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.record_login(&identity).await?;
        self.owner_of(&identity).await
    }

    /// Sign in with an already verified phone number.
    ///
    /// New phone users get the placeholder email `<digits>@phone.local`; an
    /// account already holding that email gets the phone identity linked.
    pub async fn find_or_create_user_by_phone(
        &self,
        phone: &str,
        name: Option<String>,
    ) -> Result<User> {
        let phone = phone.trim();
        let digits = phone_digits(phone);
        if digits.is_empty() {
            return Err(AppError::Validation(vec![
                "Field 'phone': must contain at least one digit".to_string(),
            ]));
        }

        if let Some(identity) = self.store.find_identity(PROVIDER_PHONE_OTP, phone).await? {
            self.record_login(&identity).await?;
            return self.owner_of(&identity).await;
        }

        let now = timestamp();
        let metadata = metadata_object([
            (META_PHONE, json!(phone)),
            (META_PHONE_VERIFIED, json!(true)),
            (META_REGISTERED_AT, json!(now)),
            (META_LAST_LOGIN_AT, json!(now)),
        ]);
        let identity = NewIdentity::new(PROVIDER_PHONE_OTP, phone, Some(metadata));
        let email = format!("{}@{}", digits, PHONE_PLACEHOLDER_DOMAIN);

        if let Some(user) = self.store.find_user_by_email(&email).await? {
            self.store.link_identity(user.id, identity).await?;
            tracing::info!("Linked phone identity to user {}", user.id);
            return Ok(user);
        }

        let user = self
            .store
            .create_user(NewUser::new(email, name), identity)
            .await?;
        tracing::info!("Created user {} via phone", user.id);
        Ok(user)
    }

    /// Remove every identity of `provider` from the account, keeping at least
    /// one way to sign in.
    pub async fn unlink_identity(&self, user_id: Uuid, provider: &str) -> Result<()> {
        self.get_user_by_id(user_id).await?;

        let identities = self.store.list_identities(user_id).await?;
        if identities.len() <= 1 {
            return Err(AppError::LastIdentity);
        }

        let matching = identities
            .iter()
            .filter(|i| i.provider == provider)
            .count();
        if matching == 0 {
            return Err(AppError::NotFound(format!(
                "No {} identity is linked to this user",
                provider
            )));
        }
        if matching == identities.len() {
            return Err(AppError::LastIdentity);
        }

        let removed = self.store.soft_delete_identities(user_id, provider).await?;
        tracing::info!(
            "Unlinked {} {} identities from user {}",
            removed,
            provider,
            user_id
        );
        Ok(())
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.find_user_by_email(email).await
    }

    pub async fn get_user_identities(&self, user_id: Uuid) -> Result<Vec<UserIdentity>> {
        self.get_user_by_id(user_id).await?;
        self.store.list_identities(user_id).await
    }

    pub async fn update_user(&self, user_id: Uuid, patch: UserPatch) -> Result<User> {
        self.store
            .update_user(user_id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn owner_of(&self, identity: &UserIdentity) -> Result<User> {
        self.get_user_by_id(identity.user_id).await
    }

    async fn record_login(&self, identity: &UserIdentity) -> Result<()> {
        let merged = merge_metadata(
            identity.metadata.clone(),
            metadata_object([(META_LAST_LOGIN_AT, json!(timestamp()))]),
        );
        self.store.update_identity_metadata(identity.id, merged).await
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let params = self.password_params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }
}

/// Checks `password` against a PHC-format Argon2 hash. A malformed hash
/// never matches.
async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}

fn email_taken() -> AppError {
    AppError::DuplicateUser("User with this email already exists".to_string())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
