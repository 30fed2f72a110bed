// Report module - console output, artifacts and channel payloads

pub mod chat;
pub mod console;
pub mod html;
pub mod json;

use crate::state::{RunSummary, TestOutcome};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use chat::{ChatMessage, to_chat_blocks};
pub use console::ConsoleReporter;
pub use html::{HtmlReporter, to_html_report};
pub use json::JsonReporter;

/// Reporter trait
pub trait Reporter: Send + Sync {
    /// Called when a test finishes
    fn on_test_end(&self, outcome: &TestOutcome);

    /// Called once the run has been finalized
    fn on_run_end(&self, summary: &RunSummary) -> Result<()>;
}

/// External metadata rendered into reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    /// Human readable suite name, e.g. "PanXpan E2E Test"
    pub title: String,
    pub repository: Option<String>,
    /// Deep link to the CI run
    pub run_url: Option<String>,
}

/// Itemization caps and thresholds shared by the formatters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormatLimits {
    /// Failed tests itemized in chat before eliding
    #[serde(default = "default_failed_items")]
    pub failed_items: usize,

    /// Passed tests are itemized in chat only up to this count
    #[serde(default = "default_passed_items")]
    pub passed_items: usize,

    /// Skipped tests itemized in chat before eliding
    #[serde(default = "default_skipped_items")]
    pub skipped_items: usize,

    /// A test is slow when its duration exceeds this multiple of the mean
    #[serde(default = "default_slow_factor")]
    pub slow_factor: f64,

    /// Error text length in chat payloads
    #[serde(default = "default_error_chars")]
    pub error_chars: usize,
}

impl Default for FormatLimits {
    fn default() -> Self {
        Self {
            failed_items: default_failed_items(),
            passed_items: default_passed_items(),
            skipped_items: default_skipped_items(),
            slow_factor: default_slow_factor(),
            error_chars: default_error_chars(),
        }
    }
}

fn default_failed_items() -> usize {
    10
}

fn default_passed_items() -> usize {
    10
}

fn default_skipped_items() -> usize {
    5
}

fn default_slow_factor() -> f64 {
    1.5
}

fn default_error_chars() -> usize {
    200
}

/// Render milliseconds the way people read them: `850ms`, `4.2s`, `3m 05s`
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let secs = ms / 1000;
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// The always-printed one-liner: `passed=3, failed=1, skipped=0`
pub fn summary_line(summary: &RunSummary) -> String {
    format!(
        "passed={}, failed={}, skipped={}",
        summary.counts.passed, summary.counts.failed, summary.counts.skipped
    )
}
