//! Digest delivery targets

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::{MessengerSettings, SinkKind};

/// One flushed digest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestPayload {
    pub label: String,
    pub lines: Vec<String>,
}

/// Where a digest ends up
pub trait DigestSink: Send + Sync {
    fn deliver(&self, payload: &DigestPayload) -> Result<()>;
}

/// Writes the digest to the log
pub struct LogSink;

impl DigestSink for LogSink {
    fn deliver(&self, payload: &DigestPayload) -> Result<()> {
        tracing::info!("{} ({} completions)", payload.label, payload.lines.len());
        for line in &payload.lines {
            tracing::info!("  {}", line);
        }
        Ok(())
    }
}

/// Posts the digest as JSON to a notification webhook
pub struct WebhookSink {
    url: String,
    recipients: Vec<String>,
    client: ureq::Agent,
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    label: &'a str,
    recipients: &'a [String],
    lines: &'a [String],
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, recipients: Vec<String>, timeout: Duration) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();

        Self {
            url: url.into(),
            recipients,
            client,
        }
    }
}

impl DigestSink for WebhookSink {
    fn deliver(&self, payload: &DigestPayload) -> Result<()> {
        let body = WebhookBody {
            label: &payload.label,
            recipients: &self.recipients,
            lines: &payload.lines,
        };

        match self.client.post(&self.url).send_json(&body) {
            Ok(_) => {
                tracing::info!(
                    "Delivered digest '{}' ({} lines) to {}",
                    payload.label,
                    payload.lines.len(),
                    self.url
                );
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => {
                bail!("Digest webhook {} rejected the digest with status {}", self.url, code)
            }
            Err(e) => {
                Err(e).with_context(|| format!("Failed to reach digest webhook {}", self.url))
            }
        }
    }
}

/// Build the sink described by the messenger settings
pub fn sink_from_settings(settings: &MessengerSettings) -> Result<Box<dyn DigestSink>> {
    match settings.sink {
        SinkKind::Log => Ok(Box::new(LogSink)),
        SinkKind::Webhook => {
            let Some(url) = settings.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) else {
                bail!("settings.messenger.webhook_url is required when sink = \"webhook\"");
            };
            Ok(Box::new(WebhookSink::new(
                url.trim(),
                settings.recipients.clone(),
                Duration::from_secs(settings.timeout_secs),
            )))
        }
    }
}
