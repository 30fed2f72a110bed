// Main entry point for panxpan-reporter

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use panxpan_reporter::cli::Cli;
use panxpan_reporter::commands;
use panxpan_reporter::config::NotifyConfig;
use panxpan_reporter::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);
    debug!("Starting panxpan-reporter v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &cli.init_config {
        return commands::handle_init_config(path);
    }

    let config = commands::resolve_config(cli.config.as_deref())?;
    // Environment is read exactly once, here
    let notify = NotifyConfig::from_env();

    // Test failures and notification failures both leave the exit code at 0
    commands::handle_report(&cli, &config, &notify).await?;
    Ok(())
}
