//! Notification delivery for the homework bot.
//!
//! `TelegramNotifier` posts plain text to one fixed chat through the
//! Telegram Bot API. Callers in the poll loop go through [`notify`], which
//! is best-effort: a failed delivery is logged and never propagated.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use homework_common::config::Credentials;
use homework_common::error::{HomeworkError, Result};

/// Something that can deliver a text message to the configured chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text`. Fails with `NotifyTransport` on any delivery problem.
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` client bound to a single chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: credentials.telegram_token.clone(),
            chat_id: credentials.telegram_chat_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| HomeworkError::NotifyTransport(e.without_url().to_string()))?;

        let status = response.status();
        let reply: Option<SendMessageResponse> = response.json().await.ok();

        match reply {
            Some(SendMessageResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(SendMessageResponse { description, .. }) => {
                Err(HomeworkError::NotifyTransport(format!(
                    "Telegram returned status {}: {}",
                    status.as_u16(),
                    description.unwrap_or_else(|| "no description".to_string())
                )))
            }
            None => Err(HomeworkError::NotifyTransport(format!(
                "Telegram returned status {} with an unreadable body",
                status.as_u16()
            ))),
        }
    }
}

/// Best-effort delivery: logs the outcome and always returns normally.
///
/// Returns whether the message went out so callers can record it.
pub async fn notify(notifier: &dyn Notifier, text: &str) -> bool {
    match notifier.send(text).await {
        Ok(()) => {
            tracing::info!(text, "Bot sent message");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send message");
            false
        }
    }
}
