//! HTTP transport to the webhook bot (reqwest).

use std::time::Duration;

use async_trait::async_trait;
use chat_core::ChatApiError;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::sanitize::{parse_bot_reply, sanitize_response};

/// One request/response exchange with the bot; no retries at this level.
#[async_trait]
pub trait BotTransport: Send + Sync {
    /// `chat_input` is already sanitized. Returns the sanitized reply.
    async fn post_chat(&self, chat_input: &str, session_id: &str) -> Result<String, ChatApiError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    chat_input: &'a str,
    session_id: &'a str,
}

/// POSTs JSON to the configured webhook with a per-request timeout.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl WebhookTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Reuses an existing reqwest client (connection pool, proxies).
    pub fn with_client(client: Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify(err: reqwest::Error) -> ChatApiError {
    if err.is_timeout() {
        ChatApiError::Timeout
    } else if err.is_connect() || err.is_request() {
        ChatApiError::Network(err.to_string())
    } else {
        error!(error = %err, "Unclassified webhook failure");
        ChatApiError::Unknown(err.to_string())
    }
}

#[async_trait]
impl BotTransport for WebhookTransport {
    async fn post_chat(&self, chat_input: &str, session_id: &str) -> Result<String, ChatApiError> {
        info!(endpoint = %self.endpoint, session_id, "Sending chat message to webhook");
        debug!(chat_input, "webhook payload");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&ChatRequest {
                chat_input,
                session_id,
            })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), session_id, "Webhook returned HTTP error");
            return Err(ChatApiError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ChatApiError::Timeout
            } else {
                error!(error = %e, "Webhook response is not JSON");
                ChatApiError::InvalidResponse
            }
        })?;

        let reply = parse_bot_reply(&body)?;
        let sanitized = sanitize_response(&reply);
        info!(
            session_id,
            reply_len = sanitized.len(),
            "Webhook reply received"
        );
        Ok(sanitized)
    }
}
