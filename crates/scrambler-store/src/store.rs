use async_trait::async_trait;

use scrambler_core::{Predicate, RecordId, Result, TableName, TargetSpec};

/// Column metadata returned by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Engine type name (e.g. `int8`, `varchar`).
    pub type_name: String,
}

/// Declared primary key of a table, columns in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumns {
    pub constraint: String,
    pub columns: Vec<ColumnInfo>,
}

/// Handle to the database a run operates on.
///
/// Implementations must bind predicate values and written values as query
/// parameters. Only identifiers validated through introspection may appear
/// in query text.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Names of the updatable tables in `schema`.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Columns of `table`, in ordinal order. Empty when the table is missing.
    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>>;

    /// Declared primary key of `table`, if any.
    async fn primary_key(&self, table: &TableName) -> Result<Option<KeyColumns>>;

    /// Key values of every row of the target table matching `predicate`,
    /// ordered by key.
    async fn select_ids(&self, target: &TargetSpec, predicate: &Predicate)
    -> Result<Vec<RecordId>>;

    /// Set the target field of one row. Returns the number of rows affected.
    async fn update_field(&self, target: &TargetSpec, id: &RecordId, value: &str) -> Result<u64>;
}
