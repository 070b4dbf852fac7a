use async_trait::async_trait;
use sqlx::PgPool;

use scrambler_core::{Predicate, RecordId, Result, TableName, TargetSpec};

use crate::store::{ColumnInfo, KeyColumns, Store};

mod queries;
pub mod sql;

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        queries::list_tables(&self.pool, schema).await
    }

    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        queries::list_columns(&self.pool, table).await
    }

    async fn primary_key(&self, table: &TableName) -> Result<Option<KeyColumns>> {
        queries::get_primary_key(&self.pool, table).await
    }

    async fn select_ids(
        &self,
        target: &TargetSpec,
        predicate: &Predicate,
    ) -> Result<Vec<RecordId>> {
        queries::select_ids(&self.pool, target, predicate).await
    }

    async fn update_field(&self, target: &TargetSpec, id: &RecordId, value: &str) -> Result<u64> {
        queries::update_field(&self.pool, target, id, value).await
    }
}
