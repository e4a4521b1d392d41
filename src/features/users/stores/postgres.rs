use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::IdentityStore;
use crate::core::database::SoftDeleteQuery;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{
    NewIdentity, NewUser, User, UserIdentity, UserPatch, IDENTITY_COLUMNS, USER_COLUMNS,
};

const USERS: SoftDeleteQuery = SoftDeleteQuery::new("users");
const IDENTITIES: SoftDeleteQuery = SoftDeleteQuery::new("user_identities");

/// [`IdentityStore`] backed by the `users` and `user_identities` tables
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn write_error(err: sqlx::Error) -> AppError {
    if AppError::is_unique_violation(&err) {
        AppError::DuplicateUser(
            "An account with this email or sign-in identity already exists".to_string(),
        )
    } else {
        tracing::error!("Failed to write user data: {:?}", err);
        AppError::Database(err)
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let mut query = USERS.select(USER_COLUMNS);
        query.push(" AND id = ").push_bind(user_id);

        Ok(query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut query = USERS.select(USER_COLUMNS);
        query.push(" AND email = ").push_bind(email);

        Ok(query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_identity(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<UserIdentity>> {
        let mut query = IDENTITIES.select(IDENTITY_COLUMNS);
        query
            .push(" AND provider = ")
            .push_bind(provider)
            .push(" AND provider_id = ")
            .push_bind(provider_id);

        Ok(query
            .build_query_as::<UserIdentity>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_identities(&self, user_id: Uuid) -> Result<Vec<UserIdentity>> {
        let mut query = IDENTITIES.select(IDENTITY_COLUMNS);
        query
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" ORDER BY created_at");

        Ok(query
            .build_query_as::<UserIdentity>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser, identity: NewIdentity) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let mut insert_user = USERS
            .insert(&["id", "email", "name", "gender", "age", "dob"])
            .value(Uuid::now_v7())
            .value(user.email)
            .value(user.name)
            .value(user.gender)
            .value(user.age)
            .value(user.dob)
            .returning(USER_COLUMNS);
        let created = insert_user
            .build_query_as::<User>()
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

        let mut insert_identity = IDENTITIES
            .insert(&["id", "user_id", "provider", "provider_id", "metadata"])
            .value(Uuid::now_v7())
            .value(created.id)
            .value(identity.provider)
            .value(identity.provider_id)
            .value(identity.metadata)
            .returning("id");
        insert_identity
            .build()
            .execute(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await?;
        Ok(created)
    }

    async fn link_identity(&self, user_id: Uuid, identity: NewIdentity) -> Result<UserIdentity> {
        let mut insert = IDENTITIES
            .insert(&["id", "user_id", "provider", "provider_id", "metadata"])
            .value(Uuid::now_v7())
            .value(user_id)
            .value(identity.provider)
            .value(identity.provider_id)
            .value(identity.metadata)
            .returning(IDENTITY_COLUMNS);

        insert
            .build_query_as::<UserIdentity>()
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)
    }

    async fn update_identity_metadata(&self, identity_id: Uuid, metadata: Value) -> Result<()> {
        let mut query = IDENTITIES.update().set("metadata", metadata).scoped();
        query.push(" AND id = ").push_bind(identity_id);

        query.build().execute(&self.pool).await.map_err(write_error)?;
        Ok(())
    }

    async fn update_user(&self, user_id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return self.find_user_by_id(user_id).await;
        }

        let mut update = USERS.update();
        if let Some(name) = patch.name {
            update = update.set("name", name);
        }
        if let Some(gender) = patch.gender {
            update = update.set("gender", gender);
        }
        if let Some(age) = patch.age {
            update = update.set("age", age);
        }
        if let Some(dob) = patch.dob {
            update = update.set("dob", dob);
        }
        if let Some(job_role) = patch.job_role {
            update = update.set("job_role", job_role);
        }
        if let Some(city) = patch.city {
            update = update.set("city", city);
        }
        if let Some(work_duration) = patch.work_duration {
            update = update.set("work_duration", work_duration);
        }
        if let Some(distance) = patch.distance {
            update = update.set("distance", distance);
        }
        if let Some(job_type) = patch.job_type {
            update = update.set("job_type", job_type);
        }
        if let Some(salary) = patch.salary {
            update = update.set("salary", salary);
        }
        if let Some(company) = patch.company {
            update = update.set("company", company);
        }

        let mut query = update.scoped();
        query
            .push(" AND id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)
    }

    async fn soft_delete_identities(&self, user_id: Uuid, provider: &str) -> Result<u64> {
        let mut query = IDENTITIES.soft_delete();
        query
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" AND provider = ")
            .push_bind(provider);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
