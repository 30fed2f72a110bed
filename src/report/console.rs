// Console reporter - numbered per-test lines and the end-of-run summary

use std::sync::atomic::{AtomicUsize, Ordering};

use console::style;

use super::{Reporter, RunContext, format_duration, summary_line};
use crate::state::{RunSummary, TestOutcome, TestStatus};

/// Console reporter
pub struct ConsoleReporter {
    context: RunContext,
    numbered: bool,
    counter: AtomicUsize,
}

impl ConsoleReporter {
    /// Create new console reporter. `numbered` prints one line per finished test.
    pub fn new(context: RunContext, numbered: bool) -> Self {
        Self {
            context,
            numbered,
            counter: AtomicUsize::new(0),
        }
    }

    /// `[3] donate with card - FAILED`
    pub fn numbered_line(index: usize, outcome: &TestOutcome) -> String {
        format!(
            "[{}] {} - {}",
            index,
            outcome.title,
            outcome.status().as_str().to_uppercase()
        )
    }

    fn styled(line: String, status: &TestStatus) -> String {
        match status {
            TestStatus::Passed => style(line).green().to_string(),
            TestStatus::Failed | TestStatus::TimedOut => style(line).red().to_string(),
            TestStatus::Skipped => style(line).yellow().to_string(),
            TestStatus::Interrupted | TestStatus::Other(_) => style(line).dim().to_string(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_test_end(&self, outcome: &TestOutcome) {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        if self.numbered {
            let line = Self::numbered_line(index, outcome);
            println!("{}", Self::styled(line, outcome.status()));
        }
    }

    fn on_run_end(&self, summary: &RunSummary) -> anyhow::Result<()> {
        let verdict = summary.verdict();
        println!();
        println!(
            "{} [{}] Completed run: {} ({} in {})",
            verdict.emoji(),
            self.context.title,
            summary_line(summary),
            verdict,
            format_duration(summary.total_duration_ms)
        );
        let extra = summary.counts.timed_out + summary.counts.interrupted;
        if extra > 0 {
            println!(
                "   • timedOut={}, interrupted={}",
                summary.counts.timed_out, summary.counts.interrupted
            );
        }
        Ok(())
    }
}
