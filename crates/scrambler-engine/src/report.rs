use std::fmt;

use serde::Serialize;

use scrambler_core::RunStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Status line for a batch or a whole run.
///
/// Renders as e.g. `Success: Scrambled 30 of 45 user emails.` or
/// `Error: Only scrambled 40 of 45 user emails (5 failed).`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub noun: String,
    pub verb: String,
    pub stats: RunStats,
}

impl BatchReport {
    pub fn new(noun: impl Into<String>, verb: impl Into<String>, stats: RunStats) -> Self {
        Self {
            noun: noun.into(),
            verb: verb.into(),
            stats,
        }
    }

    pub fn status(&self) -> ReportStatus {
        if self.stats.failed > 0 {
            ReportStatus::Error
        } else {
            ReportStatus::Success
        }
    }

    pub fn message(&self) -> String {
        let RunStats {
            total,
            succeeded,
            failed,
            skipped,
        } = self.stats;
        let past = past_tense(&self.verb);
        let plural = pluralize(&self.noun);

        if failed > 0 {
            let details = if skipped > 0 {
                format!("({failed} failed, {skipped} skipped)")
            } else {
                format!("({failed} failed)")
            };
            return if succeeded > 0 {
                format!("Only {past} {succeeded} of {total} {plural} {details}.")
            } else {
                format!("No {plural} {past} {details}.")
            };
        }

        if succeeded > 0 || skipped > 0 {
            let skipped = if skipped > 0 {
                format!(" ({skipped} skipped)")
            } else {
                String::new()
            };
            return format!(
                "{} {succeeded} of {total} {plural}{skipped}.",
                capitalize(&past)
            );
        }

        let subject = if total == 1 { self.noun.clone() } else { plural };
        format!("{} already {past}.", capitalize(&subject))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.status() {
            ReportStatus::Success => "Success",
            ReportStatus::Error => "Error",
        };
        write!(f, "{label}: {}", self.message())
    }
}

/// Receives progress after each batch and the final summary.
pub trait ProgressSink {
    fn batch_finished(&mut self, batch: usize, batches: usize, report: &BatchReport);

    fn run_finished(&mut self, report: &BatchReport);
}

fn past_tense(verb: &str) -> String {
    if verb.ends_with('e') {
        format!("{verb}d")
    } else {
        format!("{verb}ed")
    }
}

fn pluralize(noun: &str) -> String {
    if noun.ends_with('s') {
        format!("{noun}es")
    } else {
        format!("{noun}s")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(total: u64, succeeded: u64, failed: u64, skipped: u64) -> String {
        BatchReport::new(
            "user email",
            "scramble",
            RunStats {
                total,
                succeeded,
                failed,
                skipped,
            },
        )
        .to_string()
    }

    #[test]
    fn success_lines() {
        assert_eq!(report(45, 30, 0, 0), "Success: Scrambled 30 of 45 user emails.");
        assert_eq!(
            report(45, 44, 0, 1),
            "Success: Scrambled 44 of 45 user emails (1 skipped)."
        );
        assert_eq!(report(0, 0, 0, 0), "Success: User emails already scrambled.");
    }

    #[test]
    fn failure_lines() {
        assert_eq!(
            report(45, 40, 5, 0),
            "Error: Only scrambled 40 of 45 user emails (5 failed)."
        );
        assert_eq!(
            report(3, 0, 2, 1),
            "Error: No user emails scrambled (2 failed, 1 skipped)."
        );
    }
}
