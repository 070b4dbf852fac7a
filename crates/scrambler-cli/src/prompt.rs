use std::io::{self, BufRead, Write};

use scrambler_engine::{BatchReport, Confirm, ProgressSink};

/// Yes/no prompt on stderr, answered on stdin. EOF or an IO error declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{message} [y/n] ")
            .and_then(|()| stderr.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints one status line per batch, then `Done!`.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    batches_seen: usize,
}

impl ProgressSink for ConsoleProgress {
    fn batch_finished(&mut self, batch: usize, batches: usize, report: &BatchReport) {
        if self.batches_seen == 0 {
            println!("Scrambling in {batches} batch(es):");
        }
        self.batches_seen += 1;
        println!("[{batch}/{batches}] {report}");
    }

    fn run_finished(&mut self, report: &BatchReport) {
        if self.batches_seen == 0 {
            println!("{report}");
        }
        println!("Done!");
    }
}
