// Report command - ingest a run, print the summary, write artifacts, notify

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader};
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::config::{Config, NotifyConfig};
use crate::ingest::{self, IngestStats};
use crate::notify::{DispatchReport, Dispatcher, email_subject};
use crate::report::{self, Reporter};
use crate::state::ResultAccumulator;

pub async fn handle_report(cli: &Cli, config: &Config, notify: &NotifyConfig) -> Result<DispatchReport> {
    let context = notify.run_context(&config.report.title);

    // Setup reporters
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(report::ConsoleReporter::new(
        context.clone(),
        !cli.quiet,
    ))];
    if let Some(path) = &cli.json_output {
        reporters.push(Box::new(report::JsonReporter::new(path.clone())));
    }
    if let Some(path) = &cli.html_output {
        reporters.push(Box::new(report::HtmlReporter::new(
            path.clone(),
            context.clone(),
            config.limits,
        )));
    }

    let accumulator = ResultAccumulator::new();
    let read = match cli.events_path() {
        Some(path) => File::open(path)
            .with_context(|| format!("Failed to open event stream: {}", path.display()))
            .and_then(|file| ingest::ingest(BufReader::new(file), &accumulator, &reporters)),
        None => ingest::ingest(io::stdin().lock(), &accumulator, &reporters),
    };
    // Whatever was recorded before an input error is still summarized
    let (stats, input_error) = match read {
        Ok(stats) => (stats, None),
        Err(e) => {
            error!("{:#}", e);
            let stats = IngestStats {
                recorded: accumulator.total(),
                ..IngestStats::default()
            };
            (stats, Some(e))
        }
    };

    if stats.malformed > 0 {
        warn!("{} malformed event line(s) skipped", stats.malformed);
    }
    let total_duration_ms = stats.total_duration_ms.unwrap_or_else(|| {
        warn!("Event stream ended without run_end; using summed test durations");
        accumulator.summed_duration_ms()
    });

    let summary = accumulator.finalize(total_duration_ms);
    info!("Recorded {} outcome(s)", stats.recorded);

    // Artifact failures are reported after notifications went out
    let mut artifact_error = None;
    for reporter in &reporters {
        if let Err(e) = reporter.on_run_end(&summary) {
            error!("{:#}", e);
            artifact_error.get_or_insert(e);
        }
    }

    let dispatch = if input_error.is_some() {
        warn!("Event stream incomplete, notifications skipped");
        DispatchReport::default()
    } else if cli.dry_run {
        println!();
        println!(
            "Email subject: {}",
            email_subject(&context.title, &summary)
        );
        println!("Slack payload:");
        let payload = report::to_chat_blocks(&summary, &context, &config.limits);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        DispatchReport::default()
    } else {
        match Dispatcher::new(notify, config) {
            Ok(dispatcher) => dispatcher.dispatch_all(&summary).await,
            Err(e) => {
                error!("Failed to initialize HTTP client, notifications skipped: {}", e);
                DispatchReport::default()
            }
        }
    };
    info!("Notifications: email {}, slack {}", dispatch.email, dispatch.chat);

    match input_error.or(artifact_error) {
        Some(e) => Err(e),
        None => Ok(dispatch),
    }
}
