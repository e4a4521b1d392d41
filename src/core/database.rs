use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, Encode, PgPool, Postgres, QueryBuilder, Type};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Query builders for a table whose rows are soft-deleted.
///
/// Every statement produced here only sees (or creates) live rows: reads and
/// updates end in `WHERE is_deleted = FALSE`, inserts always write
/// `is_deleted = FALSE`. Callers extend the condition with `AND ...`.
#[derive(Debug, Clone, Copy)]
pub struct SoftDeleteQuery {
    table: &'static str,
}

impl SoftDeleteQuery {
    pub const fn new(table: &'static str) -> Self {
        Self { table }
    }

    /// `SELECT <columns> FROM <table> WHERE is_deleted = FALSE`
    pub fn select<'a>(&self, columns: &str) -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE is_deleted = FALSE",
            columns, self.table
        ))
    }

    pub fn update<'a>(&self) -> UpdateBuilder<'a> {
        UpdateBuilder {
            builder: QueryBuilder::new(format!("UPDATE {} SET ", self.table)),
        }
    }

    pub fn insert<'a>(&self, columns: &[&str]) -> InsertBuilder<'a> {
        let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", self.table));
        for column in columns {
            builder.push(column).push(", ");
        }
        builder.push("is_deleted) VALUES (");

        InsertBuilder {
            builder,
            expected: columns.len(),
            bound: 0,
        }
    }

    /// Marks live rows deleted; callers narrow it with `AND ...`.
    pub fn soft_delete<'a>(&self) -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new(format!(
            "UPDATE {} SET is_deleted = TRUE, updated_at = NOW() WHERE is_deleted = FALSE",
            self.table
        ))
    }
}

/// `UPDATE ... SET` over live rows. `updated_at` is always refreshed.
pub struct UpdateBuilder<'a> {
    builder: QueryBuilder<'a, Postgres>,
}

impl<'a> UpdateBuilder<'a> {
    pub fn set<T>(mut self, column: &str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres>,
    {
        self.builder.push(column).push(" = ").push_bind(value).push(", ");
        self
    }

    /// Close the `SET` list and open the live-row condition.
    pub fn scoped(mut self) -> QueryBuilder<'a, Postgres> {
        self.builder
            .push("updated_at = NOW() WHERE is_deleted = FALSE");
        self.builder
    }
}

/// `INSERT` of one live row. Values are bound in column order.
pub struct InsertBuilder<'a> {
    builder: QueryBuilder<'a, Postgres>,
    expected: usize,
    bound: usize,
}

impl<'a> InsertBuilder<'a> {
    pub fn value<T>(mut self, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres>,
    {
        self.builder.push_bind(value).push(", ");
        self.bound += 1;
        self
    }

    pub fn returning(mut self, columns: &str) -> QueryBuilder<'a, Postgres> {
        debug_assert_eq!(
            self.bound, self.expected,
            "insert binds {} values for {} columns",
            self.bound, self.expected
        );
        self.builder.push("FALSE) RETURNING ").push(columns);
        self.builder
    }
}
