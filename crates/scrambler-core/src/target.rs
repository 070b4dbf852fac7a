use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A table inside a PostgreSQL namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableName {
    pub schema: String,
    pub name: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `table` or `schema.table`, trimming surrounding whitespace.
    ///
    /// A bare name lands in `default_schema`.
    pub fn parse(input: &str, default_schema: &str) -> Result<Self> {
        let input = input.trim();
        let (schema, name) = match input.split_once('.') {
            Some((schema, name)) => (schema.trim(), name.trim()),
            None => (default_schema, input),
        };

        if schema.is_empty() || name.is_empty() || name.contains('.') {
            return Err(Error::InvalidConfig(format!("malformed table name: {input:?}")));
        }

        Ok(Self::new(schema, name))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A column identifier that has been checked against live schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How primary-key values are carried and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// `smallint`, `integer` or `bigint`; bound as `i64`.
    Integer,
    /// Anything else; compared through its text form.
    Other,
}

impl KeyKind {
    /// Classify a Postgres type name (`udt_name`, e.g. `int4`).
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" => KeyKind::Integer,
            _ => KeyKind::Other,
        }
    }
}

/// A single-column primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub column: ColumnName,
    pub kind: KeyKind,
}

/// The fully resolved table, field, and key a run operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub table: TableName,
    pub field: ColumnName,
    pub primary_key: PrimaryKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_uses_default_schema() {
        let table = TableName::parse("  wp_users ", "public").expect("parse");
        assert_eq!(table, TableName::new("public", "wp_users"));
        assert_eq!(table.to_string(), "public.wp_users");
    }

    #[test]
    fn qualified_name_keeps_schema() {
        let table = TableName::parse("sales.orders", "public").expect("parse");
        assert_eq!(table.schema, "sales");
        assert_eq!(table.name, "orders");
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(TableName::parse("", "public").is_err());
        assert!(TableName::parse(".orders", "public").is_err());
        assert!(TableName::parse("a.b.c", "public").is_err());
    }

    #[test]
    fn classifies_integer_keys() {
        assert_eq!(KeyKind::from_type_name("int8"), KeyKind::Integer);
        assert_eq!(KeyKind::from_type_name("uuid"), KeyKind::Other);
    }
}
