//! # chat-runtime
//!
//! The chat widget's logic: [`ChatController`] owns [`chat_core::ChatState`], coordinates
//! [`chat_storage::ChatStorage`] and a [`chat_core::BotClient`], and enforces the client-side
//! [`RateLimiter`]. Presentational layers subscribe to state snapshots and call the imperative
//! operations; they never touch storage directly.

mod controller;
mod events;
mod rate_limiter;

#[cfg(test)]
mod rate_limiter_test;

pub use controller::{user_facing_error, ChatController, RATE_LIMITED_MESSAGE};
pub use events::track;
pub use rate_limiter::RateLimiter;
