// Email channel - Mailgun messages API

use email_address::EmailAddress;
use tracing::debug;

use super::{Channel, DispatchError};
use crate::config::{
    Config, ENV_EMAIL_TO, ENV_MAILGUN_API_KEY, ENV_MAILGUN_DOMAIN, EmailSettings,
};
use crate::state::RunSummary;

/// Outbound message
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Complete, validated Mailgun destination
#[derive(Debug, Clone, PartialEq)]
pub struct EmailTarget {
    pub api_base: String,
    pub domain: String,
    pub api_key: String,
    pub from: String,
    pub recipients: Vec<String>,
}

impl EmailTarget {
    /// Credentials are all-or-nothing: any missing piece makes the channel
    /// unconfigured.
    pub fn resolve(settings: &EmailSettings, config: &Config) -> Result<Self, DispatchError> {
        let missing: Vec<&str> = [
            (ENV_MAILGUN_API_KEY, &settings.api_key),
            (ENV_MAILGUN_DOMAIN, &settings.domain),
            (ENV_EMAIL_TO, &settings.recipient),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect();

        let (Some(api_key), Some(domain), Some(recipient)) =
            (&settings.api_key, &settings.domain, &settings.recipient)
        else {
            return Err(DispatchError::config(
                Channel::Email,
                format!("missing {}", missing.join(", ")),
            ));
        };

        let recipients: Vec<String> = recipient
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if recipients.is_empty() {
            return Err(DispatchError::config(Channel::Email, "EMAIL_TO has no addresses"));
        }
        if let Some(bad) = recipients.iter().find(|r| !EmailAddress::is_valid(r)) {
            return Err(DispatchError::config(
                Channel::Email,
                format!("invalid recipient address '{}'", bad),
            ));
        }

        let from = settings
            .from
            .clone()
            .or_else(|| config.report.from.clone())
            .unwrap_or_else(|| format!("PanXpan E2E <noreply@{}>", domain));

        let api_base = settings
            .api_base
            .as_deref()
            .unwrap_or(&config.delivery.mailgun_api_base)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_base,
            domain: domain.clone(),
            api_key: api_key.clone(),
            from,
            recipients,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v3/{}/messages", self.api_base, self.domain)
    }
}

/// `"<Title> Results - <PASSED|FAILED> (<passed>/<total> passed)"`
pub fn email_subject(title: &str, summary: &RunSummary) -> String {
    format!(
        "{} Results - {} ({}/{} passed)",
        title,
        summary.verdict(),
        summary.counts.passed,
        summary.total()
    )
}

pub(crate) async fn send(
    client: &reqwest::Client,
    target: &EmailTarget,
    message: &EmailMessage,
) -> Result<(), DispatchError> {
    let endpoint = target.endpoint();
    debug!("Submitting report email to {}", endpoint);

    let response = client
        .post(&endpoint)
        .basic_auth("api", Some(&target.api_key))
        .form(&[
            ("from", &message.from),
            ("to", &message.to),
            ("subject", &message.subject),
            ("html", &message.html),
        ])
        .send()
        .await
        .map_err(|e| DispatchError::from_reqwest(Channel::Email, &e))?;

    if !response.status().is_success() {
        return Err(DispatchError::from_response(Channel::Email, response).await);
    }

    Ok(())
}
