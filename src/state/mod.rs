// State module - run result accumulation
// Collects test outcomes as they complete and snapshots them into a summary

pub mod accumulator;
pub mod result;
pub mod summary;

pub use accumulator::ResultAccumulator;
pub use result::TestOutcome;
pub use summary::{RunSummary, StatusCounts, Verdict};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Test status as reported by the runner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    TimedOut,
    Interrupted,
    /// Anything the runner sent that is not one of the known statuses.
    /// Kept verbatim, never counted.
    Other(String),
}

impl TestStatus {
    pub const KNOWN: [TestStatus; 5] = [
        TestStatus::Passed,
        TestStatus::Failed,
        TestStatus::Skipped,
        TestStatus::TimedOut,
        TestStatus::Interrupted,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::TimedOut => "timedOut",
            Self::Interrupted => "interrupted",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for TestStatus {
    fn from(s: &str) -> Self {
        match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "timedOut" => Self::TimedOut,
            "interrupted" => Self::Interrupted,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TestStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<TestStatus> for String {
    fn from(status: TestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
