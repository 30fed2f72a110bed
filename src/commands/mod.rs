// Commands module - handles CLI command execution

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

pub mod report;

pub use report::handle_report;

/// Write the default configuration file
pub fn handle_init_config(path: &Path) -> Result<()> {
    let toml_content = Config::default().to_toml();
    std::fs::write(path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    println!("Configuration file created: {}", path.display());
    println!("\nSecrets and channel switches are read from the environment:");
    println!("  SEND_REPORT_EMAIL, MAILGUN_API_KEY, MAILGUN_DOMAIN, EMAIL_TO");
    println!("  SEND_SLACK_NOTIFICATION, SLACK_WEBHOOK_URL");
    println!("  REPOSITORY, RUN_ID, SERVER_URL (run link)");
    Ok(())
}

/// Config from --config, else the default search path, else defaults
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Some(Config::load_from_file(path)?),
        None => Config::load()?,
    };
    Ok(config.unwrap_or_default())
}
