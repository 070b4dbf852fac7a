use serde::{Deserialize, Serialize};

/// Per-run counters.
///
/// `total` is fixed when the candidate snapshot is taken; the other counters
/// only grow and never exceed it together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunStats {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed + self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.processed() == self.total
    }

    pub fn record_success(&mut self) {
        debug_assert!(self.processed() < self.total);
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        debug_assert!(self.processed() < self.total);
        self.failed += 1;
    }

    pub fn record_skip(&mut self) {
        debug_assert!(self.processed() < self.total);
        self.skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_up_to_total() {
        let mut stats = RunStats::new(3);
        stats.record_success();
        stats.record_failure();
        assert!(!stats.is_complete());
        stats.record_skip();
        assert!(stats.is_complete());
        assert_eq!(stats.processed(), 3);
    }
}
