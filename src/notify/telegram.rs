// =============================================================================
// Telegram Bot API client
// =============================================================================
//
// Text goes through `sendMessage` with HTML parse mode; images through
// `sendPhoto` as multipart uploads. A non-2xx response from Telegram is an
// error to the caller, who decides whether it matters (the orchestrator
// logs and continues).
//
// SECURITY: the bot token is part of the URL; it must never be logged.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::notify::Notifier;

/// Telegram Bot API client bound to one chat.
#[derive(Clone)]
pub struct TelegramClient {
    bot_token: String,
    chat_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            base_url: "https://api.telegram.org".to_string(),
            client,
        }
    }

    /// Override the endpoint base (used against local fixtures in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    #[instrument(skip(self, message), name = "telegram::send_text")]
    async fn send_text(&self, message: &str) -> Result<()> {
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", message),
            ("parse_mode", "HTML"),
        ];

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await
            .context("POST sendMessage request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage returned {status}: {body}");
        }

        debug!(chars = message.len(), "text notification delivered");
        Ok(())
    }

    #[instrument(skip(self, caption, image), name = "telegram::send_photo")]
    async fn send_photo(&self, caption: &str, image: Vec<u8>) -> Result<()> {
        let photo = reqwest::multipart::Part::bytes(image)
            .file_name("chart.png")
            .mime_str("image/png")
            .context("failed to build photo part")?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let resp = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .context("POST sendPhoto request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendPhoto returned {status}: {body}");
        }

        debug!("photo notification delivered");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token_and_method() {
        let client = TelegramClient::new("123:abc", "42");
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn base_url_override_for_tests() {
        let client = TelegramClient::new("123:abc", "42").with_base_url("http://127.0.0.1:9999");
        assert_eq!(
            client.method_url("sendPhoto"),
            "http://127.0.0.1:9999/bot123:abc/sendPhoto"
        );
    }
}
