//! Pushover client implementing [`Notifier`] over the JSON messages API.

use crate::notify::notifier::{Notifier, NotifyFuture};
use crate::runtime::config::{ConfigError, PushoverConfig};
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;

pub const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";
pub const START_TITLE: &str = "Started Monitoring...";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to deliver pushover message: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pushover rejected message with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    token: &'a str,
    user: &'a str,
    device: &'a str,
    title: &'a str,
    message: &'a str,
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    client: Client,
    endpoint: String,
    token: String,
    user: String,
    device: String,
}

impl PushoverNotifier {
    pub fn new(config: &PushoverConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build pushover HTTP client")?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &PushoverConfig, client: Client) -> Self {
        tracing::debug!(endpoint = config.endpoint(), "creating pushover notifier");
        Self {
            client,
            endpoint: config.endpoint().to_owned(),
            token: config.token().to_owned(),
            user: config.user().to_owned(),
            device: config.device().to_owned(),
        }
    }

    /// Checks the credentials required by the messages API.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "pushover.token",
            });
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "pushover.user",
            });
        }
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, title: &str, message: &str, url: &str) -> Result<(), NotifyError> {
        let body = MessageBody {
            token: &self.token,
            user: &self.user,
            device: &self.device,
            title,
            message,
            url,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }
        Ok(())
    }

    async fn deliver(&self, kind: &'static str, title: &str, message: &str, url: &str) {
        match self.post(title, message, url).await {
            Ok(()) => tracing::debug!(kind, url, "pushover message delivered"),
            Err(err) => tracing::error!(kind, url, error = %err, "pushover delivery failed"),
        }
    }
}

impl Notifier for PushoverNotifier {
    fn notify_start<'a>(&'a self, message: &'a str, url: &'a str) -> NotifyFuture<'a> {
        tracing::info!(url, "notifying user that monitoring started");
        Box::pin(self.deliver("start", START_TITLE, message, url))
    }

    fn notify_change<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
        url: &'a str,
    ) -> NotifyFuture<'a> {
        tracing::info!(url, "notifying user of site change");
        Box::pin(self.deliver("change", title, message, url))
    }

    fn send_summary<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
        url: &'a str,
    ) -> NotifyFuture<'a> {
        tracing::info!(url, "sending summary to user");
        Box::pin(self.deliver("summary", title, message, url))
    }
}
