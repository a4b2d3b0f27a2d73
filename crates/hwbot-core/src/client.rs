//! Endpoint client for the homework-statuses API.
//!
//! [`StatusSource`] is the capability the orchestrator polls; [`PracticumClient`]
//! is the HTTP implementation. One call is one request: retry timing belongs
//! to the loop.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Result, WatchError};

#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch every status change since `from_date` (seconds since epoch).
    async fn fetch(&self, from_date: i64) -> Result<Value>;
}

pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        tracing::debug!(from_date, endpoint = %self.endpoint, "requesting homework statuses");

        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| WatchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WatchError::Remote {
                status_code: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WatchError::InvalidResponse(format!("body is not valid JSON: {e}")))
    }
}
