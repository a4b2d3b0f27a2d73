//! Outbound notifications.
//!
//! [`Messenger`] is the raw messaging capability; [`Notifier`] binds it to the
//! one recipient configured at startup, logs the outcome and classifies any
//! failure as [`WatchError::Delivery`]. Failures are always returned to the
//! caller.

use async_trait::async_trait;
use telegram_bot::BotClient;

use crate::error::{Result, WatchError};

/// Transport-specific failure reported by a [`Messenger`].
pub type SendError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `recipient`.
    async fn send(&self, recipient: &str, text: &str) -> std::result::Result<(), SendError>;
}

#[async_trait]
impl Messenger for BotClient {
    async fn send(&self, recipient: &str, text: &str) -> std::result::Result<(), SendError> {
        self.send_message(recipient, text).await?;
        Ok(())
    }
}

pub struct Notifier<M> {
    messenger: M,
    recipient: String,
}

impl<M: Messenger> Notifier<M> {
    pub fn new(messenger: M, recipient: impl Into<String>) -> Self {
        Self {
            messenger,
            recipient: recipient.into(),
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        tracing::debug!("sending notification");
        match self.messenger.send(&self.recipient, text).await {
            Ok(()) => {
                tracing::info!(text, "notification sent");
                Ok(())
            }
            Err(cause) => {
                tracing::error!(%cause, "notification failed");
                Err(WatchError::Delivery(cause.to_string()))
            }
        }
    }
}
