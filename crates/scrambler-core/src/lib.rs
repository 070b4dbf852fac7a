//! Core contracts shared by the scrambler crates.
//!
//! Defines the resolved target model, the typed selection predicate, run
//! statistics, the validated option set, and the error taxonomy used by the
//! store, the engine, and the CLI.

pub mod error;
pub mod options;
pub mod predicate;
pub mod record;
pub mod redaction;
pub mod stats;
pub mod target;

pub use error::{Error, Result, SchemaError};
pub use options::{
    DEFAULT_BATCH_SIZE, DEFAULT_DOMAIN, DEFAULT_FIELD, DEFAULT_SCHEMA, DEFAULT_TABLE_PREFIX,
    ScrambleOptions, non_blank,
};
pub use predicate::{Fragment, Predicate};
pub use record::RecordId;
pub use redaction::{RedactedConnection, redact_connection_string};
pub use stats::RunStats;
pub use target::{ColumnName, KeyKind, PrimaryKey, TableName, TargetSpec};
