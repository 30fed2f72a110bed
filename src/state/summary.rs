// Run summary - immutable snapshot produced at run end

use crate::state::{TestOutcome, TestStatus};
use serde::Serialize;
use std::fmt;

/// Per-status counters. Every known status is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub timed_out: usize,
    pub interrupted: usize,
}

impl StatusCounts {
    pub fn get(&self, status: &TestStatus) -> usize {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Failed => self.failed,
            TestStatus::Skipped => self.skipped,
            TestStatus::TimedOut => self.timed_out,
            TestStatus::Interrupted => self.interrupted,
            TestStatus::Other(_) => 0,
        }
    }

    /// Bump the bucket for `status`. Returns false for unrecognized statuses.
    pub(crate) fn increment(&mut self, status: &TestStatus) -> bool {
        let bucket = match status {
            TestStatus::Passed => &mut self.passed,
            TestStatus::Failed => &mut self.failed,
            TestStatus::Skipped => &mut self.skipped,
            TestStatus::TimedOut => &mut self.timed_out,
            TestStatus::Interrupted => &mut self.interrupted,
            TestStatus::Other(_) => return false,
        };
        *bucket += 1;
        true
    }
}

/// Overall run verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Passed => "✅",
            Self::Failed => "❌",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub counts: StatusCounts,
    #[serde(rename = "totalDurationMillis")]
    pub total_duration_ms: u64,
    pub outcomes: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn new(counts: StatusCounts, total_duration_ms: u64, outcomes: Vec<TestOutcome>) -> Self {
        Self {
            counts,
            total_duration_ms,
            outcomes,
        }
    }

    /// Number of recorded outcomes, including unrecognized statuses
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn verdict(&self) -> Verdict {
        if self.counts.failed > 0 {
            Verdict::Failed
        } else {
            Verdict::Passed
        }
    }

    /// Mean wall-clock share per test. None for an empty run.
    pub fn mean_duration_ms(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            n => Some(self.total_duration_ms as f64 / n as f64),
        }
    }

    pub fn is_slow(&self, outcome: &TestOutcome, slow_factor: f64) -> bool {
        self.mean_duration_ms()
            .is_some_and(|mean| outcome.duration_ms as f64 > slow_factor * mean)
    }

    pub fn outcomes_with<'a>(
        &'a self,
        status: &'a TestStatus,
    ) -> impl Iterator<Item = &'a TestOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.status() == status)
    }

    /// Timed out, interrupted and unrecognized outcomes
    pub fn other_outcomes(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter().filter(|o| {
            !matches!(
                o.status(),
                TestStatus::Passed | TestStatus::Failed | TestStatus::Skipped
            )
        })
    }
}
