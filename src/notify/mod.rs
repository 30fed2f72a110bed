// Notify module - best-effort delivery of run reports to email and Slack
//
// Each channel gets at most one attempt per run. Failures are returned as
// typed errors and never change the process exit status.

pub mod chat;
pub mod email;

use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, NotifyConfig};
use crate::report::{RunContext, to_chat_blocks, to_html_report};
use crate::state::RunSummary;

pub use email::{EmailMessage, EmailTarget, email_subject};

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Chat,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Chat => f.write_str("chat"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Channel enabled but required settings are absent or invalid
    #[error("{channel} channel is enabled but misconfigured: {reason}")]
    Config { channel: Channel, reason: String },

    /// Network, auth or non-2xx response while sending
    #[error("{channel} delivery failed: {reason}")]
    Delivery {
        channel: Channel,
        status: Option<u16>,
        reason: String,
    },
}

impl DispatchError {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Config { channel, .. } | Self::Delivery { channel, .. } => *channel,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub(crate) fn config(channel: Channel, reason: impl Into<String>) -> Self {
        Self::Config {
            channel,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_reqwest(channel: Channel, err: &reqwest::Error) -> Self {
        let mut reason = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        Self::Delivery {
            channel,
            status: err.status().map(|s| s.as_u16()),
            reason,
        }
    }

    pub(crate) async fn from_response(channel: Channel, response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(300).collect();
        Self::Delivery {
            channel,
            status: Some(status.as_u16()),
            reason: format!("HTTP {}: {}", status, body.trim()),
        }
    }
}

/// Successful dispatch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Channel switched off, nothing sent
    Disabled,
    Sent,
}

/// Terminal state of one channel for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelState {
    #[default]
    NotAttempted,
    SkippedDisabled,
    SkippedMisconfigured,
    Sent,
    Failed,
}

impl ChannelState {
    pub fn from_result(result: &Result<Delivery, DispatchError>) -> Self {
        match result {
            Ok(Delivery::Disabled) => Self::SkippedDisabled,
            Ok(Delivery::Sent) => Self::Sent,
            Err(e) if e.is_config() => Self::SkippedMisconfigured,
            Err(_) => Self::Failed,
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotAttempted => "not attempted",
            Self::SkippedDisabled => "skipped (disabled)",
            Self::SkippedMisconfigured => "skipped (misconfigured)",
            Self::Sent => "sent",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Per-channel outcome of a run's dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub email: ChannelState,
    pub chat: ChannelState,
}

/// Sends formatted summaries to the configured channels
pub struct Dispatcher<'a> {
    notify: &'a NotifyConfig,
    config: &'a Config,
    client: reqwest::Client,
}

impl<'a> Dispatcher<'a> {
    pub fn new(notify: &'a NotifyConfig, config: &'a Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.delivery.request_timeout())
            .user_agent(concat!("panxpan-reporter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            notify,
            config,
            client,
        })
    }

    fn context(&self) -> RunContext {
        self.notify.run_context(&self.config.report.title)
    }

    /// Render the HTML report and submit it through Mailgun
    pub async fn dispatch_email(&self, summary: &RunSummary) -> Result<Delivery, DispatchError> {
        if !self.notify.email_enabled {
            debug!("Email report disabled");
            return Ok(Delivery::Disabled);
        }

        let target = EmailTarget::resolve(&self.notify.email, self.config)?;
        let context = self.context();
        let message = EmailMessage {
            from: target.from.clone(),
            to: target.recipients.join(", "),
            subject: email_subject(&context.title, summary),
            html: to_html_report(summary, &context, &self.config.limits),
        };

        email::send(&self.client, &target, &message).await?;
        Ok(Delivery::Sent)
    }

    /// Post the Block Kit payload to the Slack webhook
    pub async fn dispatch_chat(&self, summary: &RunSummary) -> Result<Delivery, DispatchError> {
        if !self.notify.chat_enabled {
            debug!("Slack notification disabled");
            return Ok(Delivery::Disabled);
        }

        let webhook = chat::resolve_webhook(self.notify.chat_webhook_url.as_deref())?;
        let payload = to_chat_blocks(summary, &self.context(), &self.config.limits);

        chat::post(&self.client, webhook, &payload).await?;
        Ok(Delivery::Sent)
    }

    /// Attempt both channels concurrently. Never fails; errors are logged and
    /// folded into the report.
    pub async fn dispatch_all(&self, summary: &RunSummary) -> DispatchReport {
        let (email, chat) = tokio::join!(self.dispatch_email(summary), self.dispatch_chat(summary));

        DispatchReport {
            email: log_result(Channel::Email, &email),
            chat: log_result(Channel::Chat, &chat),
        }
    }
}

fn log_result(channel: Channel, result: &Result<Delivery, DispatchError>) -> ChannelState {
    match result {
        Ok(Delivery::Sent) => info!("Sent {} report", channel),
        Ok(Delivery::Disabled) => {}
        Err(e) if e.is_config() => warn!("{}; skipping", e),
        Err(e) => error!("{}", e),
    }
    ChannelState::from_result(result)
}
