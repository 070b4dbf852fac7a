//! In-process store for tests and local experiments.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use scrambler_core::{
    ColumnName, Error, KeyKind, Predicate, RecordId, Result, TableName, TargetSpec,
};

use crate::store::{ColumnInfo, KeyColumns, Store};

/// A table held in memory: typed columns, an optional key, and rows of
/// nullable text cells aligned with the columns.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<ColumnInfo>,
    primary_key: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &str, type_name: &str) -> Self {
        self.columns.push(ColumnInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Append a row. Cells are matched to columns by position.
    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<String>,
    {
        let mut row: Vec<Option<String>> =
            cells.into_iter().map(|cell| cell.map(Into::into)).collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        self
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|info| info.name == column)
    }

    fn cell<'a>(&self, row: &'a [Option<String>], column: &ColumnName) -> Option<&'a str> {
        self.position(column.as_str())
            .and_then(|index| row.get(index))
            .and_then(|cell| cell.as_deref())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<TableName, MemoryTable>,
    failing_ids: HashSet<RecordId>,
    vanish_after_select: HashSet<RecordId>,
    writes: u64,
}

/// Store over in-memory tables.
///
/// Write failures and rows deleted mid-run can be simulated with
/// [`MemoryStore::fail_writes_for`] and [`MemoryStore::vanish_after_select`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: TableName, contents: MemoryTable) -> Self {
        self.lock().tables.insert(table, contents);
        self
    }

    /// Make updates of these ids fail with a database error.
    pub fn fail_writes_for(&self, ids: impl IntoIterator<Item = RecordId>) {
        self.lock().failing_ids.extend(ids);
    }

    /// Delete these rows right after the next candidate selection.
    pub fn vanish_after_select(&self, ids: impl IntoIterator<Item = RecordId>) {
        self.lock().vanish_after_select.extend(ids);
    }

    /// Number of successful row updates so far.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    /// Current values of `column`, in row order.
    pub fn column_values(&self, table: &TableName, column: &str) -> Vec<Option<String>> {
        let state = self.lock();
        let Some(contents) = state.tables.get(table) else {
            return Vec::new();
        };
        let Some(index) = contents.position(column) else {
            return Vec::new();
        };
        contents.rows.iter().map(|row| row[index].clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn missing_relation(table: &TableName) -> Error {
    Error::Db(format!("relation {table} does not exist"))
}

fn record_id(cell: Option<&str>, kind: KeyKind) -> Result<RecordId> {
    let text = cell.ok_or_else(|| Error::Db("null primary key value".to_string()))?;
    match kind {
        KeyKind::Integer => text
            .parse::<i64>()
            .map(RecordId::Int)
            .map_err(|err| Error::Db(format!("invalid integer key {text:?}: {err}"))),
        KeyKind::Other => Ok(RecordId::Text(text.to_string())),
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .tables
            .keys()
            .filter(|table| table.schema == schema)
            .map(|table| table.name.clone())
            .collect())
    }

    async fn list_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        Ok(self
            .lock()
            .tables
            .get(table)
            .map(|contents| contents.columns.clone())
            .unwrap_or_default())
    }

    async fn primary_key(&self, table: &TableName) -> Result<Option<KeyColumns>> {
        let state = self.lock();
        let contents = state.tables.get(table).ok_or_else(|| missing_relation(table))?;
        if contents.primary_key.is_empty() {
            return Ok(None);
        }

        let columns = contents
            .primary_key
            .iter()
            .filter_map(|name| contents.columns.iter().find(|info| &info.name == name))
            .cloned()
            .collect();
        Ok(Some(KeyColumns {
            constraint: format!("{}_pkey", table.name),
            columns,
        }))
    }

    async fn select_ids(
        &self,
        target: &TargetSpec,
        predicate: &Predicate,
    ) -> Result<Vec<RecordId>> {
        let mut state = self.lock();
        let contents = state
            .tables
            .get(&target.table)
            .ok_or_else(|| missing_relation(&target.table))?;
        let key = &target.primary_key;

        let mut ids = contents
            .rows
            .iter()
            .filter(|row| predicate.matches(|column| contents.cell(row, column)))
            .map(|row| record_id(contents.cell(row, &key.column), key.kind))
            .collect::<Result<Vec<_>>>()?;
        ids.sort_by(|left, right| match (left, right) {
            (RecordId::Int(left), RecordId::Int(right)) => left.cmp(right),
            _ => left.to_string().cmp(&right.to_string()),
        });

        let vanishing = std::mem::take(&mut state.vanish_after_select);
        if !vanishing.is_empty()
            && let Some(contents) = state.tables.get_mut(&target.table)
            && let Some(index) = contents.position(key.column.as_str())
        {
            contents.rows.retain(|row| {
                record_id(row[index].as_deref(), key.kind)
                    .map(|id| !vanishing.contains(&id))
                    .unwrap_or(true)
            });
        }

        Ok(ids)
    }

    async fn update_field(&self, target: &TargetSpec, id: &RecordId, value: &str) -> Result<u64> {
        let mut state = self.lock();
        if state.failing_ids.contains(id) {
            return Err(Error::Db(format!("simulated write failure for {id}")));
        }

        let contents = state
            .tables
            .get_mut(&target.table)
            .ok_or_else(|| missing_relation(&target.table))?;
        let field = contents
            .position(target.field.as_str())
            .ok_or_else(|| Error::Db(format!("column {} does not exist", target.field)))?;
        let key = contents
            .position(target.primary_key.column.as_str())
            .ok_or_else(|| {
                Error::Db(format!("column {} does not exist", target.primary_key.column))
            })?;

        let mut affected = 0;
        for row in &mut contents.rows {
            let matches = match (row[key].as_deref(), id) {
                (Some(cell), RecordId::Int(id)) => cell.parse::<i64>().ok() == Some(*id),
                (Some(cell), RecordId::Text(id)) => cell == id,
                (None, _) => false,
            };
            if matches {
                row[field] = Some(value.to_string());
                affected += 1;
            }
        }

        state.writes += affected;
        Ok(affected)
    }
}
