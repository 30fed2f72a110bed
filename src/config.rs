// Configuration handling
// File settings (.panxpanrc.toml) plus environment-provided notification settings

use crate::report::{FormatLimits, RunContext};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub limits: FormatLimits,

    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Suite name used in headers and the email subject
    #[serde(default = "default_title")]
    pub title: String,

    /// Sender address; defaults to noreply@<MAILGUN_DOMAIN>
    #[serde(default)]
    pub from: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            from: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Mailgun API base URL (EU accounts use https://api.eu.mailgun.net)
    #[serde(default = "default_mailgun_api_base")]
    pub mailgun_api_base: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            mailgun_api_base: default_mailgun_api_base(),
        }
    }
}

impl DeliveryConfig {
    /// Per-request timeout; `0` means the default rather than "expire immediately"
    pub fn request_timeout(&self) -> Duration {
        match self.timeout {
            0 => Duration::from_secs(default_timeout()),
            secs => Duration::from_secs(secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// Environment keys
pub const ENV_SEND_REPORT_EMAIL: &str = "SEND_REPORT_EMAIL";
pub const ENV_MAILGUN_API_KEY: &str = "MAILGUN_API_KEY";
pub const ENV_MAILGUN_DOMAIN: &str = "MAILGUN_DOMAIN";
pub const ENV_MAILGUN_API_BASE: &str = "MAILGUN_API_BASE";
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";
pub const ENV_EMAIL_FROM: &str = "EMAIL_FROM";
pub const ENV_SEND_SLACK_NOTIFICATION: &str = "SEND_SLACK_NOTIFICATION";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_REPOSITORY: &str = "REPOSITORY";
pub const ENV_RUN_ID: &str = "RUN_ID";
pub const ENV_SERVER_URL: &str = "SERVER_URL";

pub const CONFIG_FILE_NAME: &str = ".panxpanrc.toml";

pub fn default_title() -> String {
    String::from("PanXpan E2E Test")
}

pub fn default_timeout() -> u64 {
    10
}

pub fn default_mailgun_api_base() -> String {
    String::from("https://api.mailgun.net")
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Result<Option<Self>, ConfigError> {
        // 1. ./.panxpanrc.toml
        // 2. ~/.panxpanrc.toml
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::load_from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Email channel settings as found in the environment. Completeness is
/// checked at dispatch time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailSettings {
    pub api_key: Option<String>,
    pub domain: Option<String>,
    pub recipient: Option<String>,
    pub from: Option<String>,
    pub api_base: Option<String>,
}

/// CI run coordinates used for the deep link
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunVars {
    pub repository: Option<String>,
    pub run_id: Option<String>,
    pub server_url: Option<String>,
}

impl RunVars {
    /// `<server_url>/<repository>/actions/runs/<run_id>`, when all three are
    /// set and the server URL parses
    pub fn run_url(&self) -> Option<String> {
        let (server, repo, run_id) = (
            self.server_url.as_deref()?,
            self.repository.as_deref()?,
            self.run_id.as_deref()?,
        );
        url::Url::parse(server).ok()?;
        Some(format!(
            "{}/{}/actions/runs/{}",
            server.trim_end_matches('/'),
            repo.trim_matches('/'),
            run_id
        ))
    }
}

/// Notification settings, resolved once at process start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyConfig {
    pub email_enabled: bool,
    pub email: EmailSettings,
    pub chat_enabled: bool,
    pub chat_webhook_url: Option<String>,
    pub run: RunVars,
}

/// `true`, `1`, `yes` and `on` (any case) enable a switch
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

impl NotifyConfig {
    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| get(key).is_some_and(|v| parse_flag(&v));

        Self {
            email_enabled: flag(ENV_SEND_REPORT_EMAIL),
            email: EmailSettings {
                api_key: get(ENV_MAILGUN_API_KEY),
                domain: get(ENV_MAILGUN_DOMAIN),
                recipient: get(ENV_EMAIL_TO),
                from: get(ENV_EMAIL_FROM),
                api_base: get(ENV_MAILGUN_API_BASE),
            },
            chat_enabled: flag(ENV_SEND_SLACK_NOTIFICATION),
            chat_webhook_url: get(ENV_SLACK_WEBHOOK_URL),
            run: RunVars {
                repository: get(ENV_REPOSITORY),
                run_id: get(ENV_RUN_ID),
                server_url: get(ENV_SERVER_URL),
            },
        }
    }

    /// Formatter context for this run
    pub fn run_context(&self, title: &str) -> RunContext {
        RunContext {
            title: title.to_string(),
            repository: self.run.repository.clone(),
            run_url: self.run.run_url(),
        }
    }
}
