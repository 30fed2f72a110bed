// Chat channel - Slack incoming webhook

use tracing::debug;

use super::{Channel, DispatchError};
use crate::config::ENV_SLACK_WEBHOOK_URL;
use crate::report::ChatMessage;

pub(crate) fn resolve_webhook(url: Option<&str>) -> Result<&str, DispatchError> {
    let url = url.ok_or_else(|| {
        DispatchError::config(Channel::Chat, format!("missing {}", ENV_SLACK_WEBHOOK_URL))
    })?;
    url::Url::parse(url).map_err(|e| {
        DispatchError::config(
            Channel::Chat,
            format!("{} is not a valid URL: {}", ENV_SLACK_WEBHOOK_URL, e),
        )
    })?;
    Ok(url)
}

pub(crate) async fn post(
    client: &reqwest::Client,
    webhook: &str,
    payload: &ChatMessage,
) -> Result<(), DispatchError> {
    debug!("Posting {} blocks to Slack webhook", payload.blocks.len());

    let response = client
        .post(webhook)
        .json(payload)
        .send()
        .await
        .map_err(|e| DispatchError::from_reqwest(Channel::Chat, &e))?;

    if !response.status().is_success() {
        return Err(DispatchError::from_response(Channel::Chat, response).await);
    }

    Ok(())
}
