// CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

/// Aggregate PanXpan E2E results and send the run report to email and Slack
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "panxpan-reporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Summarize a PanXpan E2E run and notify email/Slack",
    long_about = "Reads the runner's newline-delimited JSON event stream, prints a \
                  numbered result list and a summary line, writes optional HTML/JSON \
                  artifacts and delivers the report to the configured channels.\n\n\
                  Channels are configured through SEND_REPORT_EMAIL, MAILGUN_API_KEY, \
                  MAILGUN_DOMAIN, EMAIL_TO, SEND_SLACK_NOTIFICATION and SLACK_WEBHOOK_URL."
)]
pub struct Cli {
    /// Event stream file ("-" or omitted reads stdin)
    #[arg(value_name = "EVENTS")]
    pub events: Option<PathBuf>,

    /// Write the HTML report to this file
    #[arg(long, value_name = "FILE")]
    pub html_output: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Format everything and print the Slack payload, but send nothing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Do not print the numbered per-test lines
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Enable verbose debug output
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Configuration file (default: ./.panxpanrc.toml, then ~/.panxpanrc.toml)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Create default configuration file and exit
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,
}

impl Cli {
    /// None means stdin
    pub fn events_path(&self) -> Option<&PathBuf> {
        self.events.as_ref().filter(|p| p.as_os_str() != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "panxpan-reporter",
            "events.ndjson",
            "--html-output",
            "report.html",
            "--json-output",
            "report.json",
            "--dry-run",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.events_path(), Some(&PathBuf::from("events.ndjson")));
        assert_eq!(cli.html_output, Some(PathBuf::from("report.html")));
        assert!(cli.dry_run);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_dash_means_stdin() {
        let cli = Cli::try_parse_from(["panxpan-reporter", "-"]).unwrap();
        assert_eq!(cli.events_path(), None);
        let cli = Cli::try_parse_from(["panxpan-reporter"]).unwrap();
        assert_eq!(cli.events_path(), None);
    }
}
