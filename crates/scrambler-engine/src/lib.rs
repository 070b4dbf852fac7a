//! Target resolution, filter composition, and the batched mutation run.
//!
//! [`BatchMutator`] drives a run against any [`scrambler_store::Store`]:
//! it resolves the target through [`SchemaResolver`], asks for confirmation
//! when nothing is excluded, builds the selection with [`PredicateBuilder`],
//! snapshots the candidate keys once, and overwrites each row's field with a
//! value from [`ValueGenerator`], batch by batch.

pub mod generator;
pub mod mutator;
pub mod predicate;
pub mod report;
pub mod resolver;

pub use generator::{TOKEN_LEN, ValueGenerator, sanitize_email};
pub use mutator::{
    BatchMutator, CONFIRM_MESSAGE, Confirm, RunOutcome, RunPhase, RunReport, partition,
};
pub use predicate::PredicateBuilder;
pub use report::{BatchReport, ProgressSink, ReportStatus};
pub use resolver::{DefaultTarget, SchemaChecker, SchemaResolver};
