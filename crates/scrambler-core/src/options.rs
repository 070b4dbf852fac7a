use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::target::TableName;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";
pub const DEFAULT_FIELD: &str = "user_email";
/// RFC 2606 reserves `.test`; mail to it is never delivered.
pub const DEFAULT_DOMAIN: &str = "example.test";
pub const DEFAULT_BATCH_SIZE: usize = 30;

/// Typed options for one scramble run.
///
/// Unset optional fields fall back to the defaults above. Built once from
/// the config file and command line, then validated before anything touches
/// the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrambleOptions {
    /// Schema used for table names given without one.
    pub schema: String,
    /// Prefix of the default `users` table.
    pub table_prefix: String,
    pub table: Option<String>,
    pub field: Option<String>,
    /// Comma-separated substrings; rows whose field contains any are left alone.
    pub ignored_domains: Option<String>,
    pub where_field: Option<String>,
    pub where_value: Option<String>,
    /// Domain of generated placeholder addresses.
    pub domain: String,
    pub batch_size: usize,
    pub seed: Option<u64>,
    pub assume_yes: bool,
    pub dry_run: bool,
}

impl Default for ScrambleOptions {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            table: None,
            field: None,
            ignored_domains: None,
            where_field: None,
            where_value: None,
            domain: DEFAULT_DOMAIN.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            assume_yes: false,
            dry_run: false,
        }
    }
}

impl ScrambleOptions {
    /// Check values that do not need the database.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".to_string()));
        }
        if self.schema.trim().is_empty() {
            return Err(Error::InvalidConfig("schema must not be empty".to_string()));
        }
        if self.domain.trim().is_empty() {
            return Err(Error::InvalidConfig("domain must not be empty".to_string()));
        }
        if let Some(table) = non_blank(self.table.as_deref()) {
            TableName::parse(table, &self.schema)?;
        }
        Ok(())
    }

    /// Whether the caller asked for a non-default table.
    pub fn has_custom_table(&self) -> bool {
        non_blank(self.table.as_deref()).is_some()
    }

    pub fn has_custom_field(&self) -> bool {
        non_blank(self.field.as_deref()).is_some()
    }
}

/// Treat whitespace-only option values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = ScrambleOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.batch_size, 30);
        assert!(!options.has_custom_table());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let options = ScrambleOptions {
            batch_size: 0,
            ..ScrambleOptions::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn blank_table_counts_as_default() {
        let options = ScrambleOptions {
            table: Some("   ".to_string()),
            ..ScrambleOptions::default()
        };
        assert!(!options.has_custom_table());
        assert!(options.validate().is_ok());
    }
}
