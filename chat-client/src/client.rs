//! ChatApiClient: validation, transport call and the retry loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_core::{BotClient, ChatApiError, ChatConfig};
use tracing::{error, info, instrument, warn};

use crate::sanitize::sanitize_input;
use crate::transport::{BotTransport, WebhookTransport};

/// Retry policy for transport failures (`NETWORK_ERROR`, `TIMEOUT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^retry_count, max)`.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry_count);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Bot client over a [`BotTransport`]; retries are sequential, each waiting out the previous
/// attempt before its backoff delay starts.
#[derive(Clone)]
pub struct ChatApiClient {
    transport: Arc<dyn BotTransport>,
    retry: RetryPolicy,
}

impl ChatApiClient {
    pub fn new(transport: Arc<dyn BotTransport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// Webhook transport built from the endpoint, timeout and retry count in `config`.
    pub fn from_config(config: &ChatConfig) -> Self {
        let transport = WebhookTransport::new(config.api_endpoint.clone(), config.timeout);
        Self::new(Arc::new(transport)).with_retry_policy(RetryPolicy {
            max_retries: config.max_retries,
            ..RetryPolicy::default()
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn send_message_to_bot(
        &self,
        message: &str,
        session_id: &str,
    ) -> Result<String, ChatApiError> {
        self.send_with_retry_count(message, session_id, 0).await
    }

    /// Validation failures are returned before any network call and never retried.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn send_with_retry_count(
        &self,
        message: &str,
        session_id: &str,
        mut retry_count: u32,
    ) -> Result<String, ChatApiError> {
        let sanitized = sanitize_input(message)?;

        loop {
            match self.transport.post_chat(&sanitized, session_id).await {
                Ok(reply) => {
                    info!(retry_count, "Message delivered to bot");
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() && retry_count < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry_count);
                    retry_count += 1;
                    warn!(
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        attempt = retry_count,
                        max_retries = self.retry.max_retries,
                        "Retrying chat request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        error = ?e,
                        code = e.code().map(|c| c.as_str()).unwrap_or("VALIDATION"),
                        retry_count,
                        "Chat request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl BotClient for ChatApiClient {
    async fn send_message(&self, text: &str, session_id: &str) -> Result<String, ChatApiError> {
        self.send_message_to_bot(text, session_id).await
    }
}
