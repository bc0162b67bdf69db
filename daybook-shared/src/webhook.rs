//! Outbound webhook trigger
//!
//! Posts a small JSON notification to an automation endpoint (an n8n
//! workflow in the default deployment) and reports the status code the
//! endpoint answered with. Non-2xx answers are not errors; only transport
//! failures are.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Message sent on every trigger
pub const DEFAULT_MESSAGE: &str = "Hello from MCP via Cloudflare Worker!";

/// Webhook errors
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// No URL was configured
    #[error("webhook URL is not configured")]
    NotConfigured,

    /// The request could not be delivered
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// JSON body posted to the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub message: String,

    /// RFC 3339 with millisecond precision, UTC (`2025-08-10T10:00:00.000Z`)
    pub timestamp: String,
}

impl WebhookPayload {
    pub fn new(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Client for a single webhook URL
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    /// Creates a client; `url = None` makes every trigger fail with `NotConfigured`
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Posts `payload` once and returns the HTTP status code of the answer
    pub async fn send(&self, payload: &WebhookPayload) -> Result<u16, WebhookError> {
        let url = self.url.as_deref().ok_or(WebhookError::NotConfigured)?;

        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "webhook send failed");
                e
            })?;

        let status = response.status().as_u16();
        info!(status, "Webhook triggered");
        Ok(status)
    }

    /// Posts the default message stamped with the current time
    pub async fn trigger(&self) -> Result<u16, WebhookError> {
        self.send(&WebhookPayload::new(DEFAULT_MESSAGE, Utc::now()))
            .await
    }
}
