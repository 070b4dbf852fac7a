#![allow(dead_code)]

use scrambler_core::{ScrambleOptions, TableName};
use scrambler_engine::{BatchReport, Confirm, ProgressSink};
use scrambler_store::{MemoryStore, MemoryTable};

pub fn users_table() -> TableName {
    TableName::new("public", "wp_users")
}

/// `wp_users` with `rows` accounts; `excluded(i)` decides which get an
/// `example.com`/`test.org` address instead of a customer one.
pub fn users_store(rows: usize, excluded: impl Fn(usize) -> bool) -> MemoryStore {
    let mut table = MemoryTable::new()
        .column("ID", "int8")
        .column("user_login", "text")
        .column("user_email", "varchar")
        .column("role", "text")
        .primary_key(&["ID"]);

    for index in 1..=rows {
        let email = if excluded(index) {
            let domain = if index % 2 == 0 { "example.com" } else { "test.org" };
            format!("staff{index}@{domain}")
        } else {
            format!("customer{index}@mail.net")
        };
        let role = if index == 1 { "administrator" } else { "subscriber" };
        table = table.row([
            Some(index.to_string()),
            Some(format!("user{index}")),
            Some(email),
            Some(role.to_string()),
        ]);
    }

    MemoryStore::new().with_table(users_table(), table)
}

pub fn seeded_options() -> ScrambleOptions {
    ScrambleOptions {
        seed: Some(42),
        ..ScrambleOptions::default()
    }
}

/// Scripted answer; counts how often it was asked.
pub struct ScriptedConfirm {
    pub answer: bool,
    pub asked: usize,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self { answer, asked: 0 }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.asked += 1;
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub batches: Vec<(usize, usize, BatchReport)>,
    pub finished: Option<BatchReport>,
}

impl ProgressSink for RecordingProgress {
    fn batch_finished(&mut self, batch: usize, batches: usize, report: &BatchReport) {
        self.batches.push((batch, batches, report.clone()));
    }

    fn run_finished(&mut self, report: &BatchReport) {
        self.finished = Some(report.clone());
    }
}
