//! REST push gateway client.

use async_trait::async_trait;
use serde_json::json;

use super::Notifier;
use super::errors::{NotifyError, NotifyResult};

const DEFAULT_API_URL: &str = "https://onesignal.com/api/v1/notifications";

/// Push gateway configuration
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Gateway endpoint URL
    pub api_url: String,
    /// Application id registered with the gateway
    pub app_id: String,
    /// REST API key
    pub api_key: String,
}

impl PushConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `PUSH_APP_ID` or `PUSH_API_KEY` is unset, in
    /// which case callers fall back to [`super::NoopNotifier`].
    ///
    /// Expected environment variables:
    /// - `PUSH_APP_ID`: application id
    /// - `PUSH_API_KEY`: REST API key
    /// - `PUSH_API_URL`: endpoint override (default: OneSignal)
    pub fn from_env() -> Option<Self> {
        let app_id = std::env::var("PUSH_APP_ID").ok()?;
        let api_key = std::env::var("PUSH_API_KEY").ok()?;
        let api_url =
            std::env::var("PUSH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Some(Self {
            api_url,
            app_id,
            api_key,
        })
    }
}

/// Notifier backed by a OneSignal-style REST gateway.
pub struct PushGateway {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushGateway {
    /// Create a new gateway client
    pub fn new(config: PushConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for PushGateway {
    async fn send(&self, tokens: &[String], message: &str) -> NotifyResult<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let payload = json!({
            "app_id": self.config.app_id,
            "include_player_ids": tokens,
            "contents": { "en": message },
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Basic {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}
