//! One-way operator notification channel.
//!
//! Interactive login needs a human: the provider shows an approval number
//! that the operator must confirm on their phone. The notifier carries that
//! number out-of-band. Delivery is best-effort; a lost message degrades the
//! login to a timeout, never to a crash.

use std::time::Duration;

use async_trait::async_trait;

/// Bound on a single notification delivery attempt.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers short text messages to a human operator.
#[async_trait]
pub trait OperatorNotifier: Send + Sync + std::fmt::Debug {
    /// Send `text` to the operator. Returns `true` only when the channel
    /// accepted the message; failures are logged, never raised.
    async fn notify(&self, text: &str) -> bool;
}

/// Notifier for deployments without a configured channel.
#[derive(Debug, Default, Clone)]
pub struct NullNotifier;

#[async_trait]
impl OperatorNotifier for NullNotifier {
    async fn notify(&self, text: &str) -> bool {
        tracing::debug!(text, "operator notification channel not configured, dropping message");
        false
    }
}

/// Telegram Bot API notifier.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client: reqwest::Client::new(),
        }
    }
}

// The bot token authenticates the whole bot; keep it out of debug output.
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OperatorNotifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> bool {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let result = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!("operator notified");
                true
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "operator notification rejected");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "operator notification failed");
                false
            }
        }
    }
}
