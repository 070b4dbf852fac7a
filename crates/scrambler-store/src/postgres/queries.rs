use sqlx::PgPool;

use scrambler_core::{Error, KeyKind, Predicate, RecordId, Result, TableName, TargetSpec};

use super::sql;
use crate::store::{ColumnInfo, KeyColumns};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select c.relname::text
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind in ('r','p')
        order by c.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn list_columns(pool: &PgPool, table: &TableName) -> Result<Vec<ColumnInfo>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        r#"
        select a.attname::text, t.typname::text
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(&table.schema)
    .bind(&table.name)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(name, type_name)| ColumnInfo { name, type_name })
        .collect())
}

pub async fn get_primary_key(pool: &PgPool, table: &TableName) -> Result<Option<KeyColumns>> {
    let row = sqlx::query_as::<_, (String, Vec<String>, Vec<String>)>(
        r#"
        select
          con.conname::text,
          array_agg(att.attname::text order by ord.ordinality),
          array_agg(typ.typname::text order by ord.ordinality)
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        join pg_type typ on typ.oid = att.atttypid
        where nsp.nspname = $1
          and rel.relname = $2
          and con.contype = 'p'
        group by con.conname
        "#,
    )
    .bind(&table.schema)
    .bind(&table.name)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?;

    Ok(row.map(|(constraint, names, types)| KeyColumns {
        constraint,
        columns: names
            .into_iter()
            .zip(types)
            .map(|(name, type_name)| ColumnInfo { name, type_name })
            .collect(),
    }))
}

pub async fn select_ids(
    pool: &PgPool,
    target: &TargetSpec,
    predicate: &Predicate,
) -> Result<Vec<RecordId>> {
    let mut builder = sql::select_ids(target, predicate);
    tracing::debug!(event = "select_ids", sql = builder.sql());

    let ids = match target.primary_key.kind {
        KeyKind::Integer => builder
            .build_query_scalar::<i64>()
            .fetch_all(pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(RecordId::Int)
            .collect(),
        KeyKind::Other => builder
            .build_query_scalar::<String>()
            .fetch_all(pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(RecordId::Text)
            .collect(),
    };

    Ok(ids)
}

pub async fn update_field(
    pool: &PgPool,
    target: &TargetSpec,
    id: &RecordId,
    value: &str,
) -> Result<u64> {
    let mut builder = sql::update_field(target, id, value);
    let result = builder.build().execute(pool).await.map_err(db_error)?;
    Ok(result.rows_affected())
}
