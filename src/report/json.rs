// JSON reporter - writes the run summary to a JSON file

use super::{Reporter, summary_line};
use crate::state::{RunSummary, TestOutcome};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

/// JSON reporter
pub struct JsonReporter {
    output_path: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    verdict: crate::state::Verdict,
    summary_line: String,
    total: usize,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

impl JsonReporter {
    /// Create new JSON reporter
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl Reporter for JsonReporter {
    fn on_test_end(&self, _outcome: &TestOutcome) {
        // The whole document is written at run end
    }

    fn on_run_end(&self, summary: &RunSummary) -> Result<()> {
        let file = File::create(&self.output_path).with_context(|| {
            format!(
                "Failed to create JSON report file: {}",
                self.output_path.display()
            )
        })?;

        let document = JsonDocument {
            verdict: summary.verdict(),
            summary_line: summary_line(summary),
            total: summary.total(),
            summary,
        };

        serde_json::to_writer_pretty(file, &document)
            .context("Failed to serialize run summary to JSON")?;

        Ok(())
    }
}
