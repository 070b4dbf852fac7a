mod config;
mod prompt;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use scrambler_core::{Error as CoreError, ScrambleOptions, redact_connection_string};
use scrambler_engine::{BatchMutator, RunOutcome};
use scrambler_store::PostgresStore;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use config::{ConfigError, load_options};
use prompt::{ConsoleProgress, StdinConfirm};
use registry::{RunContext, init_logging, start_run, write_failure, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "scrambler", version, about = "Scramble contact fields before testing bulk email")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overwrite a contact column with placeholder addresses.
    #[command(alias = "scramble-user-emails")]
    Scramble(ScrambleArgs),
}

#[derive(Args, Debug)]
struct ScrambleArgs {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// Database connection string (positional form). Falls back to DATABASE_URL.
    #[arg(value_name = "CONNECTION_STRING")]
    conn_pos: Option<String>,
    /// TOML file with a [scramble] table of defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Schema for unqualified table names.
    #[arg(long)]
    schema: Option<String>,
    /// Prefix of the default users table.
    #[arg(long)]
    table_prefix: Option<String>,
    /// Table to scramble (`table` or `schema.table`).
    #[arg(long)]
    table: Option<String>,
    /// Column to overwrite.
    #[arg(long)]
    field: Option<String>,
    /// Comma-separated domains (substrings) whose rows are left alone.
    #[arg(long)]
    ignored_domains: Option<String>,
    /// Only scramble rows where this column equals --where-value.
    #[arg(long)]
    where_field: Option<String>,
    #[arg(long)]
    where_value: Option<String>,
    /// Domain of the generated addresses.
    #[arg(long)]
    domain: Option<String>,
    /// Rows per batch.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Seed for reproducible placeholder values.
    #[arg(long)]
    seed: Option<u64>,
    /// Do not ask for confirmation when no domains are ignored.
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,
    /// Count the rows that would be scrambled without writing.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl ScrambleArgs {
    /// Command-line values win over the config file.
    fn apply(&self, options: &mut ScrambleOptions) {
        let overrides = [
            (&mut options.table, &self.table),
            (&mut options.field, &self.field),
            (&mut options.ignored_domains, &self.ignored_domains),
            (&mut options.where_field, &self.where_field),
            (&mut options.where_value, &self.where_value),
        ];
        for (slot, value) in overrides {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        if let Some(schema) = &self.schema {
            options.schema.clone_from(schema);
        }
        if let Some(prefix) = &self.table_prefix {
            options.table_prefix.clone_from(prefix);
        }
        if let Some(domain) = &self.domain {
            options.domain.clone_from(domain);
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size;
        }
        if self.seed.is_some() {
            options.seed = self.seed;
        }
        options.assume_yes |= self.yes;
        options.dry_run |= self.dry_run;
    }

    fn connection(&self) -> Result<String, CliError> {
        match (&self.conn, &self.conn_pos) {
            (Some(_), Some(_)) => Err(CliError::InvalidConfig(
                "use either --conn or positional connection string".to_string(),
            )),
            (Some(value), None) | (None, Some(value)) => Ok(value.clone()),
            (None, None) => std::env::var("DATABASE_URL").map_err(|_| {
                CliError::InvalidConfig("connection string is required".to_string())
            }),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Scramble(args) => run_scramble(args).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_scramble(args: ScrambleArgs) -> Result<ExitCode, CliError> {
    let mut options = load_options(args.config.as_deref())?;
    args.apply(&mut options);
    options.validate()?;

    let conn = args.connection()?;
    let connection = redact_connection_string(&conn)?;

    let run_id = Uuid::new_v4().to_string();
    let run_paths = if options.dry_run {
        None
    } else {
        let ctx = RunContext {
            run_id: run_id.clone(),
            started_at: chrono::Utc::now(),
            engine: connection.engine.clone(),
            run_dir: args.run_dir.clone(),
            options: options.clone(),
            connection: connection.clone(),
        };
        Some(start_run(&ctx)?)
    };
    init_logging(run_paths.as_ref().map(|paths| paths.logs_path.as_path()))?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        connection = %connection.redacted,
        dry_run = options.dry_run
    );
    if let Some(paths) = &run_paths {
        tracing::info!(event = "run_dir_created", path = %paths.root.display());
    }

    let result = execute(&conn, options).await;

    if let Some(paths) = &run_paths {
        match &result {
            Ok(outcome) => write_report(paths, &run_id, outcome)?,
            Err(err) => write_failure(paths, &run_id, &err.to_string())?,
        }
        tracing::info!(event = "report_written", path = %paths.report_path.display());
    }
    let outcome = result?;

    match &outcome {
        RunOutcome::Declined { .. } => {
            println!("Aborted: no rows were changed.");
            tracing::info!(event = "run_finished", status = "declined");
            Ok(ExitCode::FAILURE)
        }
        RunOutcome::Completed(report) if report.dry_run => {
            println!(
                "Dry run: {} {} row(s) would be scrambled in {} batch(es) on {}.",
                report.stats().total,
                report.target.field,
                report.batches,
                report.target.table
            );
            tracing::info!(event = "run_finished", status = "dry_run");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Completed(report) => {
            let stats = report.stats();
            tracing::info!(
                event = "run_finished",
                status = "success",
                duration_ms = report.duration_ms,
                total = stats.total,
                succeeded = stats.succeeded,
                failed = stats.failed,
                skipped = stats.skipped
            );
            Ok(if stats.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

/// Connect, then drive one run to an outcome.
async fn execute(conn: &str, options: ScrambleOptions) -> Result<RunOutcome, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    let store = PostgresStore::new(pool);

    let mutator = BatchMutator::new(&store, options)?;
    let outcome = mutator
        .run(&mut StdinConfirm, &mut ConsoleProgress::default())
        .await?;
    Ok(outcome)
}
