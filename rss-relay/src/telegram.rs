use crate::traits::MessageSink;
use crate::types::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client bound to one chat.
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(client: Client, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    /// Sends `text` as an HTML-formatted message.
    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML"
            }))
            .send()
            .await
            // reqwest errors carry the request URL, which contains the token.
            .map_err(|e| RelayError::Http(e.without_url()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(RelayError::Telegram(format!("HTTP {}: {}", status, error_text)));
        }

        Ok(())
    }
}
