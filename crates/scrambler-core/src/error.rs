use thiserror::Error;

use crate::target::{ColumnName, TableName};

/// Schema resolution failures. Always fatal, always raised before any write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table not found: {0}")]
    TableNotFound(TableName),
    #[error("field not found: {field} on {table}")]
    FieldNotFound { table: TableName, field: String },
    #[error("no primary key on {0}")]
    NoPrimaryKey(TableName),
    #[error("composite primary key on {table} ({columns:?}) is not supported")]
    CompositePrimaryKey {
        table: TableName,
        columns: Vec<String>,
    },
    #[error("field {field} is the primary key of {table}")]
    FieldIsPrimaryKey { table: TableName, field: ColumnName },
}

/// Core error type shared across scrambler crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Target table, field, or key could not be resolved.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    /// Database error or store failure.
    #[error("database error: {0}")]
    Db(String),
    /// Option values that cannot drive a run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results returned by scrambler crates.
pub type Result<T> = std::result::Result<T, Error>;
