//! Backing-store adapters.
//!
//! Everything the engine needs from a database goes through [`Store`]:
//! schema introspection, the candidate selection, and per-row updates.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryStore, MemoryTable};
pub use postgres::PostgresStore;
pub use store::{ColumnInfo, KeyColumns, Store};
