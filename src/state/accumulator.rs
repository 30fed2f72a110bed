// Result accumulator - collects outcomes as tests complete

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::state::{RunSummary, StatusCounts, TestOutcome};

#[derive(Debug, Default)]
struct Inner {
    counts: StatusCounts,
    outcomes: Vec<TestOutcome>,
}

/// Per-run outcome storage, shareable across worker threads
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    inner: Mutex<Inner>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still holds consistent data: every mutation below is a
    // single push plus a single increment.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an outcome in completion order and bump its status counter
    pub fn record_outcome(&self, outcome: TestOutcome) {
        let mut inner = self.lock();
        if !inner.counts.increment(outcome.status()) {
            debug!(
                "Unrecognized status '{}' for '{}', keeping outcome uncounted",
                outcome.status(),
                outcome.title
            );
        }
        inner.outcomes.push(outcome);
    }

    /// Snapshot the run. Repeated calls return equal summaries.
    pub fn finalize(&self, total_duration_ms: u64) -> RunSummary {
        let inner = self.lock();
        RunSummary::new(inner.counts, total_duration_ms, inner.outcomes.clone())
    }

    pub fn total(&self) -> usize {
        self.lock().outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.lock().counts.passed
    }

    pub fn failed(&self) -> usize {
        self.lock().counts.failed
    }

    pub fn skipped(&self) -> usize {
        self.lock().counts.skipped
    }

    /// Sum of individual durations, used when the runner never reported a
    /// wall-clock total
    pub fn summed_duration_ms(&self) -> u64 {
        self.lock().outcomes.iter().map(|o| o.duration_ms).sum()
    }
}
