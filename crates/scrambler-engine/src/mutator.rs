use std::fmt;
use std::slice::Chunks;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use scrambler_core::{Predicate, RecordId, Result, RunStats, ScrambleOptions, TargetSpec};
use scrambler_store::Store;

use crate::generator::ValueGenerator;
use crate::predicate::PredicateBuilder;
use crate::report::{BatchReport, ProgressSink};
use crate::resolver::{DefaultTarget, SchemaResolver};

const VERB: &str = "scramble";

pub const CONFIRM_MESSAGE: &str = "You have not specified any email domains to ignore. \
This means EVERY row, including administrators, will have its value scrambled in the database. \
Are you sure you want to proceed?";

/// Operator confirmation before an unfiltered run.
pub trait Confirm {
    /// `true` to proceed.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Stages of a run, in order. There is no way back to an earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Init,
    ResolveTarget,
    Confirm,
    BuildFilter,
    FetchCandidates,
    BatchLoop,
    Report,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::ResolveTarget => "resolve_target",
            RunPhase::Confirm => "confirm",
            RunPhase::BuildFilter => "build_filter",
            RunPhase::FetchCandidates => "fetch_candidates",
            RunPhase::BatchLoop => "batch_loop",
            RunPhase::Report => "report",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: TargetSpec,
    pub predicate: Predicate,
    pub ignored: Vec<String>,
    pub batches: usize,
    pub dry_run: bool,
    pub duration_ms: u64,
    pub summary: BatchReport,
}

impl RunReport {
    pub fn stats(&self) -> RunStats {
        self.summary.stats
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunReport),
    /// The operator declined; nothing was written.
    Declined { target: TargetSpec },
}

/// Split candidates into consecutive batches of at most `size`, in order.
pub fn partition(ids: &[RecordId], size: usize) -> Chunks<'_, RecordId> {
    ids.chunks(size.max(1))
}

/// Drives one run against a store.
pub struct BatchMutator<'a> {
    store: &'a dyn Store,
    options: ScrambleOptions,
}

impl<'a> BatchMutator<'a> {
    pub fn new(store: &'a dyn Store, options: ScrambleOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { store, options })
    }

    pub fn options(&self) -> &ScrambleOptions {
        &self.options
    }

    pub async fn run(
        &self,
        confirm: &mut dyn Confirm,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunOutcome> {
        let started = Instant::now();
        let options = &self.options;

        enter(RunPhase::Init);
        let mut generator = ValueGenerator::from_options(options)?;
        let resolver = SchemaResolver::new(self.store, DefaultTarget::from_options(options));

        enter(RunPhase::ResolveTarget);
        let target = resolver.resolve_target(options).await?;
        info!(
            event = "target_resolved",
            engine = self.store.engine(),
            table = %target.table,
            field = %target.field,
            primary_key = %target.primary_key.column
        );

        enter(RunPhase::Confirm);
        let ignored = PredicateBuilder::split_list(options.ignored_domains.as_deref());
        if ignored.is_empty()
            && !options.assume_yes
            && !options.dry_run
            && !confirm.confirm(CONFIRM_MESSAGE)
        {
            info!(event = "confirmation_declined", table = %target.table);
            enter(RunPhase::Done);
            return Ok(RunOutcome::Declined { target });
        }

        enter(RunPhase::BuildFilter);
        let builder = PredicateBuilder::new(&resolver);
        let exclusion = PredicateBuilder::exclusion_fragment(&target.field, &ignored);
        let custom = builder
            .custom_fragment(
                options.where_field.as_deref(),
                options.where_value.as_deref(),
                &target.table,
            )
            .await?;
        let predicate = PredicateBuilder::compose([exclusion, custom]);

        enter(RunPhase::FetchCandidates);
        let ids = self.store.select_ids(&target, &predicate).await?;
        let mut stats = RunStats::new(ids.len() as u64);
        let batches = partition(&ids, options.batch_size);
        let batch_count = batches.len();
        info!(
            event = "candidates_fetched",
            total = stats.total,
            batches = batch_count,
            dry_run = options.dry_run
        );

        let noun = self.noun(&target);
        if !options.dry_run {
            enter(RunPhase::BatchLoop);
            for (index, batch) in batches.enumerate() {
                for id in batch {
                    let value = generator.generate();
                    match self.store.update_field(&target, id, &value).await {
                        Ok(0) => {
                            debug!(event = "record_skipped", id = %id);
                            stats.record_skip();
                        }
                        Ok(_) => stats.record_success(),
                        Err(err) => {
                            warn!(event = "record_failed", id = %id, error = %err);
                            stats.record_failure();
                        }
                    }
                }

                let report = BatchReport::new(noun.as_str(), VERB, stats);
                info!(
                    event = "batch_finished",
                    batch = index + 1,
                    batches = batch_count,
                    total = stats.total,
                    succeeded = stats.succeeded,
                    failed = stats.failed,
                    skipped = stats.skipped
                );
                progress.batch_finished(index + 1, batch_count, &report);
            }
        }

        enter(RunPhase::Report);
        let summary = BatchReport::new(noun, VERB, stats);
        if !options.dry_run {
            progress.run_finished(&summary);
        }

        enter(RunPhase::Done);
        Ok(RunOutcome::Completed(RunReport {
            target,
            predicate,
            ignored,
            batches: batch_count,
            dry_run: options.dry_run,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            summary,
        }))
    }

    fn noun(&self, target: &TargetSpec) -> String {
        if self.options.has_custom_table() || self.options.has_custom_field() {
            format!("{} value", target.field)
        } else {
            "user email".to_string()
        }
    }
}

fn enter(phase: RunPhase) {
    debug!(event = "phase", phase = %phase);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_order_and_bounds() {
        let ids: Vec<RecordId> = (1..=65).map(RecordId::Int).collect();
        let sizes: Vec<usize> = partition(&ids, 30).map(<[RecordId]>::len).collect();
        assert_eq!(sizes, vec![30, 30, 5]);

        let flattened: Vec<RecordId> = partition(&ids, 30).flatten().cloned().collect();
        assert_eq!(flattened, ids);
    }

    #[test]
    fn partition_of_nothing_is_empty() {
        assert_eq!(partition(&[], 30).len(), 0);
    }

    #[test]
    fn phases_render_snake_case() {
        assert_eq!(RunPhase::FetchCandidates.to_string(), "fetch_candidates");
    }
}
