//! `telegram-bot` — a small async driver for the Telegram Bot API.
//!
//! Only the surface `hwbot` needs is implemented: posting a plain-text
//! message to a chat via `sendMessage`.
//!
//! # Architecture
//!
//! ```text
//! BotClient::send_message(chat_id, text)
//!     │
//!     ▼
//! POST {api_url}/bot{token}/sendMessage   ← JSON SendMessage body
//!     │
//!     ▼
//! ApiResponse<SentMessage>                ← {"ok": true, "result": …}
//!                                            {"ok": false, "error_code", "description"}
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use telegram_bot::BotClient;
//!
//! let bot = BotClient::new("123456:ABC-DEF");
//! let sent = bot.send_message("42", "hello").await?;
//! println!("delivered as message {}", sent.message_id);
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{BotClient, DEFAULT_API_URL};
pub use error::TelegramError;
pub use types::{ApiResponse, Chat, SendMessage, SentMessage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TelegramError>;
