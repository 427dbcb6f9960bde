//! Telegram Bot API Client
//!
//! Sends alert messages through `sendMessage` on the Bot API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::{Notifier, NotifyError};

/// Bot API base URL
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram notifier configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_base_url: String,
    /// Bot token from @BotFather
    pub bot_token: String,
    /// Destination chat (numeric id or @channel)
    pub chat_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base_url: TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API notifier
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.bot_token.trim().is_empty() {
            return Err(NotifyError::NotConfigured("bot token is empty".into()));
        }
        if config.chat_id.trim().is_empty() {
            return Err(NotifyError::NotConfigured("chat id is empty".into()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_base_url, self.config.bot_token)
    }

    pub fn chat_id(&self) -> &str {
        &self.config.chat_id
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: message,
            disable_web_page_preview: true,
        };

        // Errors from reqwest carry the URL, which embeds the token
        let response = self.http
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: Option<BotApiResponse> = response.json().await.ok();

        match parsed {
            Some(api) if api.ok && status.is_success() => Ok(()),
            Some(api) => Err(NotifyError::Rejected {
                status: api.error_code.unwrap_or(status.as_u16()),
                description: api.description.unwrap_or_else(|| "no description".into()),
            }),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: "unparseable Bot API response".into(),
            }),
        }
    }
}

/// Log-only notifier used when no messaging channel is configured
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!("[ALERT] {}", message);
        Ok(())
    }
}
