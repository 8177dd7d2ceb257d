//! # Chat API client
//!
//! Talks to the webhook bot: sanitizes outgoing text, POSTs `{chatInput, sessionId}`, parses and
//! sanitizes the reply, classifies failures into [`ChatApiError`] and retries transport failures
//! with capped exponential backoff.
//!
//! [`ChatApiClient`] implements [`chat_core::BotClient`], the seam the controller depends on.

mod client;
mod sanitize;
mod transport;


pub use chat_core::{generate_session_id, validate_session_id, ChatApiError, ErrorCode};
pub use client::{ChatApiClient, RetryPolicy};
pub use sanitize::{
    is_valid_message, parse_bot_reply, sanitize_input, sanitize_response, INVALID_RESPONSE_FALLBACK,
    MAX_INPUT_CHARS,
};
pub use transport::{BotTransport, WebhookTransport};
