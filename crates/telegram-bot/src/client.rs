use std::fmt;

use crate::types::{ApiResponse, SendMessage, SentMessage};
use crate::{Result, TelegramError};

/// Public Bot API host.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

// ─── BotClient ────────────────────────────────────────────────────────────

/// Handle on one bot token.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference-counted.
#[derive(Clone)]
pub struct BotClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl BotClient {
    /// Client for the public Bot API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(reqwest::Client::new(), DEFAULT_API_URL, token)
    }

    /// Client for a custom API host (local Bot API server, test double).
    pub fn with_api_url(
        http: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            api_url,
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Post a plain-text message to `chat_id`.
    ///
    /// One HTTP attempt; no retries. Telegram answers errors with a JSON
    /// envelope (`ok: false`) that is surfaced as [`TelegramError::Api`].
    /// A non-JSON error page is reported with the HTTP status instead.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage> {
        tracing::debug!(chat_id, len = text.len(), "telegram sendMessage");

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&SendMessage { chat_id, text })
            .send()
            .await?;

        let status = response.status();
        let envelope: ApiResponse<SentMessage> = match response.json().await {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or(TelegramError::EmptyResult)
    }
}

// The token is a credential; keep it out of logs and panic messages.
impl fmt::Debug for BotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
