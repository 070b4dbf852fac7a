use anyhow::{Context, Result};
use scrambler_core::{
    ColumnName, Fragment, KeyKind, Predicate, PrimaryKey, RecordId, TableName, TargetSpec,
};
use scrambler_store::{PostgresStore, Store};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, fs};

const FIXTURE_PATHS: &[&str] = &[
    "fixtures/sql/postgres/001_schema.sql",
    "fixtures/sql/postgres/002_data.sql",
];

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn run_fixture(pool: &PgPool, path: &str) -> Result<()> {
    let script = fs::read_to_string(path).with_context(|| format!("reading fixture {path}"))?;

    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }

        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture {path}"))?;
    }

    Ok(())
}

fn users_target() -> TargetSpec {
    TargetSpec {
        table: TableName::new("scrambler_it", "wp_users"),
        field: ColumnName::new("user_email"),
        primary_key: PrimaryKey {
            column: ColumnName::new("ID"),
            kind: KeyKind::Integer,
        },
    }
}

#[tokio::test]
async fn introspects_and_updates_fixture_tables() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run Postgres tests");
        return Ok(());
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    for path in FIXTURE_PATHS {
        run_fixture(&pool, path).await?;
    }

    let store = PostgresStore::new(pool);
    let target = users_target();

    let tables = store.list_tables("scrambler_it").await?;
    assert_eq!(tables, vec!["audit_log", "memberships", "wp_users"]);

    let columns = store.list_columns(&target.table).await?;
    let names: Vec<&str> = columns.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "user_login", "user_email", "role"]);

    let key = store
        .primary_key(&target.table)
        .await?
        .context("wp_users primary key")?;
    assert_eq!(key.columns.len(), 1);
    assert_eq!(key.columns[0].name, "ID");
    assert_eq!(key.columns[0].type_name, "int8");

    let audit_key = store
        .primary_key(&TableName::new("scrambler_it", "audit_log"))
        .await?;
    assert!(audit_key.is_none());

    let composite = store
        .primary_key(&TableName::new("scrambler_it", "memberships"))
        .await?
        .context("memberships primary key")?;
    assert_eq!(composite.columns.len(), 2);

    let predicate = Predicate::from_fragments(vec![
        Fragment::NotContains {
            column: ColumnName::new("user_email"),
            needle: "example.com".to_string(),
        },
        Fragment::NotContains {
            column: ColumnName::new("user_email"),
            needle: "%name".to_string(),
        },
        Fragment::NotContains {
            column: ColumnName::new("user_email"),
            needle: "o'brien".to_string(),
        },
    ]);
    let ids = store.select_ids(&target, &predicate).await?;
    // Row 7 holds `Owner@EXAMPLE.COM`.
    assert_eq!(ids, vec![RecordId::Int(2), RecordId::Int(3), RecordId::Int(6)]);

    let upper = Predicate::from_fragments(vec![Fragment::NotContains {
        column: ColumnName::new("user_email"),
        needle: "CUSTOMER.ORG".to_string(),
    }]);
    assert_eq!(
        store.select_ids(&target, &upper).await?,
        vec![
            RecordId::Int(1),
            RecordId::Int(5),
            RecordId::Int(6),
            RecordId::Int(7)
        ]
    );

    let subscribers = Predicate::from_fragments(vec![Fragment::Equals {
        column: ColumnName::new("role"),
        value: "editor".to_string(),
    }]);
    assert_eq!(
        store.select_ids(&target, &subscribers).await?,
        vec![RecordId::Int(5)]
    );

    let affected = store
        .update_field(&target, &RecordId::Int(2), "abcd1234@example.test")
        .await?;
    assert_eq!(affected, 1);
    let missing = store
        .update_field(&target, &RecordId::Int(999), "abcd1234@example.test")
        .await?;
    assert_eq!(missing, 0);

    let email: Option<String> =
        sqlx::query_scalar(r#"select user_email from scrambler_it.wp_users where "ID" = 2"#)
            .fetch_one(store.pool())
            .await?;
    assert_eq!(email.as_deref(), Some("abcd1234@example.test"));

    Ok(())
}
