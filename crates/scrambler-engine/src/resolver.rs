use scrambler_core::{
    ColumnName, DEFAULT_FIELD, KeyKind, PrimaryKey, Result, SchemaError, ScrambleOptions,
    TableName, TargetSpec, non_blank,
};
use scrambler_store::{KeyColumns, Store};

/// Default table and field, derived from options only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    schema: String,
    table_prefix: String,
}

impl DefaultTarget {
    pub fn new(schema: impl Into<String>, table_prefix: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table_prefix: table_prefix.into(),
        }
    }

    pub fn from_options(options: &ScrambleOptions) -> Self {
        Self::new(options.schema.trim(), options.table_prefix.trim())
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The platform's user-account table, `{prefix}users`.
    pub fn table(&self) -> TableName {
        TableName::new(&self.schema, format!("{}users", self.table_prefix))
    }

    pub fn field(&self) -> ColumnName {
        ColumnName::new(DEFAULT_FIELD)
    }
}

/// Existence checks against live schema metadata.
#[derive(Clone, Copy)]
pub struct SchemaChecker<'a> {
    store: &'a dyn Store,
}

impl<'a> SchemaChecker<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn table_exists(&self, table: &TableName) -> Result<bool> {
        let tables = self.store.list_tables(&table.schema).await?;
        Ok(tables.iter().any(|name| name == &table.name))
    }

    pub async fn column_exists(&self, table: &TableName, column: &str) -> Result<bool> {
        let columns = self.store.list_columns(table).await?;
        Ok(columns.iter().any(|info| info.name == column))
    }

    pub async fn primary_key(&self, table: &TableName) -> Result<Option<KeyColumns>> {
        self.store.primary_key(table).await
    }
}

/// Resolves table, field, and key in dependency order.
pub struct SchemaResolver<'a> {
    checker: SchemaChecker<'a>,
    defaults: DefaultTarget,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(store: &'a dyn Store, defaults: DefaultTarget) -> Self {
        Self {
            checker: SchemaChecker::new(store),
            defaults,
        }
    }

    pub fn defaults(&self) -> &DefaultTarget {
        &self.defaults
    }

    pub async fn resolve_table(&self, input: Option<&str>) -> Result<TableName> {
        let table = match non_blank(input) {
            Some(input) => TableName::parse(input, self.defaults.schema())?,
            None => self.defaults.table(),
        };

        if !self.checker.table_exists(&table).await? {
            return Err(SchemaError::TableNotFound(table).into());
        }
        Ok(table)
    }

    pub async fn resolve_field(
        &self,
        input: Option<&str>,
        table: &TableName,
    ) -> Result<ColumnName> {
        match non_blank(input) {
            Some(input) => self.resolve_column(input, table).await,
            None => {
                let field = self.defaults.field();
                self.resolve_column(field.as_str(), table).await
            }
        }
    }

    /// Check that `name` is a column of `table`.
    pub async fn resolve_column(&self, name: &str, table: &TableName) -> Result<ColumnName> {
        let name = name.trim();
        if !self.checker.column_exists(table, name).await? {
            return Err(SchemaError::FieldNotFound {
                table: table.clone(),
                field: name.to_string(),
            }
            .into());
        }
        Ok(ColumnName::new(name))
    }

    pub async fn resolve_primary_key(&self, table: &TableName) -> Result<PrimaryKey> {
        let key = self
            .checker
            .primary_key(table)
            .await?
            .ok_or_else(|| SchemaError::NoPrimaryKey(table.clone()))?;

        match key.columns.as_slice() {
            [] => Err(SchemaError::NoPrimaryKey(table.clone()).into()),
            [column] => Ok(PrimaryKey {
                column: ColumnName::new(&column.name),
                kind: KeyKind::from_type_name(&column.type_name),
            }),
            columns => Err(SchemaError::CompositePrimaryKey {
                table: table.clone(),
                columns: columns.iter().map(|column| column.name.clone()).collect(),
            }
            .into()),
        }
    }

    /// Table first, then field and key against the resolved table.
    pub async fn resolve_target(&self, options: &ScrambleOptions) -> Result<TargetSpec> {
        let table = self.resolve_table(options.table.as_deref()).await?;
        let field = self.resolve_field(options.field.as_deref(), &table).await?;
        let primary_key = self.resolve_primary_key(&table).await?;

        if primary_key.column == field {
            return Err(SchemaError::FieldIsPrimaryKey { table, field }.into());
        }

        Ok(TargetSpec {
            table,
            field,
            primary_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_uses_prefix() {
        let defaults = DefaultTarget::new("public", "wp_");
        assert_eq!(defaults.table(), TableName::new("public", "wp_users"));
        assert_eq!(defaults.field().as_str(), "user_email");
    }

    #[test]
    fn default_table_follows_options() {
        let options = ScrambleOptions {
            schema: "blog".to_string(),
            table_prefix: "wp2_".to_string(),
            ..ScrambleOptions::default()
        };
        let defaults = DefaultTarget::from_options(&options);
        assert_eq!(defaults.table().to_string(), "blog.wp2_users");
    }
}
