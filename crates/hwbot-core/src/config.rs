use std::time::Duration;

use crate::error::{Result, WatchError};

pub const PRACTICUM_TOKEN_ENV: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = telegram_bot::DEFAULT_API_URL;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything the bot is configured with, as read at startup.
///
/// The three secrets are optional here so that a missing one reaches the
/// startup precondition check instead of failing argument parsing.
#[derive(Clone)]
pub struct Settings {
    pub practicum_token: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub endpoint: String,
    pub telegram_api_url: String,
    pub poll_interval: Duration,
    /// Initial cursor; defaults to the current time when unset.
    pub from_date: Option<i64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            practicum_token: None,
            telegram_token: None,
            telegram_chat_id: None,
            endpoint: default_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            poll_interval: default_poll_interval(),
            from_date: None,
        }
    }
}

impl Settings {
    /// Names of the required variables that are unset or empty.
    pub fn missing(&self) -> Vec<String> {
        [
            (PRACTICUM_TOKEN_ENV, &self.practicum_token),
            (TELEGRAM_TOKEN_ENV, &self.telegram_token),
            (TELEGRAM_CHAT_ID_ENV, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        match (
            present(&self.practicum_token),
            present(&self.telegram_token),
            present(&self.telegram_chat_id),
        ) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => {
                Ok(Credentials {
                    practicum_token: practicum_token.to_string(),
                    telegram_token: telegram_token.to_string(),
                    telegram_chat_id: telegram_chat_id.to_string(),
                })
            }
            _ => Err(WatchError::MissingConfig(self.missing())),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The three secrets, all known to be non-empty.
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}
