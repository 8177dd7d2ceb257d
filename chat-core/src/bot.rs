//! The seam between the controller and whatever answers chat input.

use async_trait::async_trait;

use crate::error::ChatApiError;

/// Sends one user message to the bot and returns its (sanitized) reply.
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn send_message(&self, text: &str, session_id: &str) -> Result<String, ChatApiError>;
}
