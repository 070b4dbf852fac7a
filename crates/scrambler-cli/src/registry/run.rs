use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scrambler_core::{RedactedConnection, ScrambleOptions};
use scrambler_engine::RunOutcome;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine: String,
    pub run_dir: PathBuf,
    pub options: ScrambleOptions,
    pub connection: RedactedConnection,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
struct RunConfig<'a> {
    run_id: &'a str,
    started_at: String,
    engine: &'a str,
    options: &'a ScrambleOptions,
    connection: &'a RedactedConnection,
    git: GitInfo,
}

/// Final record of a run.
#[derive(Debug, Serialize)]
struct RunRecord<'a> {
    run_id: &'a str,
    finished_at: String,
    #[serde(flatten)]
    outcome: &'a RunOutcome,
}

/// Report of a run that stopped on an error.
#[derive(Debug, Serialize)]
struct FailedRecord<'a> {
    run_id: &'a str,
    finished_at: String,
    outcome: &'static str,
    error: &'a str,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
struct GitInfo {
    commit: Option<String>,
    dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        engine: &ctx.engine,
        options: &ctx.options,
        connection: &ctx.connection,
        git: collect_git_info(),
    };
    write_json(&root.join("config.json"), &config)?;

    let logs_path = root.join("logs.ndjson");
    OpenOptions::new().create(true).append(true).open(&logs_path)?;

    Ok(RunPaths {
        report_path: root.join("report.json"),
        logs_path,
        root,
    })
}

pub fn write_report(paths: &RunPaths, run_id: &str, outcome: &RunOutcome) -> RegistryResult<()> {
    let record = RunRecord {
        run_id,
        finished_at: Utc::now().to_rfc3339(),
        outcome,
    };
    write_json(&paths.report_path, &record)
}

/// Close a run directory whose run aborted before producing an outcome.
pub fn write_failure(paths: &RunPaths, run_id: &str, error: &str) -> RegistryResult<()> {
    let record = FailedRecord {
        run_id,
        finished_at: Utc::now().to_rfc3339(),
        outcome: "failed",
        error,
    };
    write_json(&paths.report_path, &record)
}

fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
