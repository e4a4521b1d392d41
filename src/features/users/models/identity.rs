use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

pub const IDENTITY_COLUMNS: &str =
    "id, user_id, provider, provider_id, metadata, is_deleted, created_at, updated_at";

/// One way of signing in to an account
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserIdentity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_id: String,
    pub metadata: Option<Value>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    /// String field from the identity metadata
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub provider: String,
    pub provider_id: String,
    pub metadata: Option<Value>,
}

impl NewIdentity {
    pub fn new(
        provider: impl Into<String>,
        provider_id: impl Into<String>,
        metadata: Option<Value>,
    ) -> Self {
        Self {
            provider: provider.into(),
            provider_id: provider_id.into(),
            metadata,
        }
    }
}

/// Shallow merge: top-level keys of `update` replace those in `current`.
/// A non-object on either side is replaced by `update` as a whole.
pub fn merge_metadata(current: Option<Value>, update: Value) -> Value {
    match (current, update) {
        (Some(Value::Object(mut merged)), Value::Object(update)) => {
            merged.extend(update);
            Value::Object(merged)
        }
        (None, Value::Object(update)) => Value::Object(update),
        (_, update) => update,
    }
}

/// Metadata object built from `(key, value)` pairs
pub fn metadata_object<I>(entries: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_metadata_is_shallow_and_new_keys_win() {
        let current = json!({ "picture": "old.png", "locale": "en", "nested": { "a": 1 } });
        let merged = merge_metadata(
            Some(current),
            json!({ "picture": "new.png", "nested": { "b": 2 } }),
        );

        assert_eq!(
            merged,
            json!({ "picture": "new.png", "locale": "en", "nested": { "b": 2 } })
        );
    }

    #[test]
    fn test_merge_metadata_replaces_non_objects() {
        assert_eq!(merge_metadata(None, json!({ "a": 1 })), json!({ "a": 1 }));
        assert_eq!(
            merge_metadata(Some(json!("legacy")), json!({ "a": 1 })),
            json!({ "a": 1 })
        );
    }
}
