//! Statement rendering.
//!
//! Identifiers come from introspection and are quoted; every value goes
//! through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use scrambler_core::{Fragment, KeyKind, Predicate, RecordId, TableName, TargetSpec};

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_table(table: &TableName) -> String {
    format!("{}.{}", quote_ident(&table.schema), quote_ident(&table.name))
}

/// `select <key> from <table> [where ...] order by <key>`.
pub fn select_ids(target: &TargetSpec, predicate: &Predicate) -> QueryBuilder<'static, Postgres> {
    let key = quote_ident(target.primary_key.column.as_str());
    let cast = match target.primary_key.kind {
        KeyKind::Integer => "bigint",
        KeyKind::Other => "text",
    };

    let mut builder = QueryBuilder::new(format!(
        "select {key}::{cast} from {}",
        quote_table(&target.table)
    ));
    push_where(&mut builder, predicate);
    builder.push(format!(" order by {key}"));
    builder
}

/// `update <table> set <field> = $1 where <key> = $2`.
pub fn update_field(
    target: &TargetSpec,
    id: &RecordId,
    value: &str,
) -> QueryBuilder<'static, Postgres> {
    let key = quote_ident(target.primary_key.column.as_str());
    let mut builder = QueryBuilder::new(format!(
        "update {} set {} = ",
        quote_table(&target.table),
        quote_ident(target.field.as_str())
    ));
    builder.push_bind(value.to_string());

    match id {
        RecordId::Int(value) => {
            builder.push(format!(" where {key} = "));
            builder.push_bind(*value);
        }
        RecordId::Text(value) => {
            builder.push(format!(" where {key}::text = "));
            builder.push_bind(value.clone());
        }
    }
    builder
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    for (index, fragment) in predicate.fragments().iter().enumerate() {
        builder.push(if index == 0 { " where " } else { " and " });
        match fragment {
            // strpos keeps % and _ literal, unlike LIKE. Domains compare case-folded.
            Fragment::NotContains { column, needle } => {
                builder.push(format!(
                    "coalesce(strpos(lower({}::text), lower(",
                    quote_ident(column.as_str())
                ));
                builder.push_bind(needle.clone());
                builder.push(")), 0) = 0");
            }
            Fragment::Equals { column, value } => {
                builder.push(format!("{}::text = ", quote_ident(column.as_str())));
                builder.push_bind(value.clone());
            }
        }
    }
}
