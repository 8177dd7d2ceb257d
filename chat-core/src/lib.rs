//! # chat-core
//!
//! Core types and traits for the TuSolución chat widget: [`Message`], [`ChatState`], the
//! [`BotClient`] seam, the [`ChatApiError`] taxonomy, env configuration and tracing
//! initialization. Transport-agnostic; used by chat-storage, chat-client and chat-runtime.

pub mod bot;
pub mod config;
pub mod error;
pub mod ids;
pub mod logger;
pub mod types;

#[cfg(test)]
mod types_test;

pub use bot::BotClient;
pub use config::{ChatConfig, RateLimitConfig};
pub use error::{ChatApiError, ErrorCode, ValidationError};
pub use ids::{generate_message_id, generate_session_id, validate_session_id};
pub use logger::init_tracing;
pub use types::{
    ChatEvent, ChatSession, ChatState, Message, Preferences, PreferencesUpdate, Sender, Theme,
};
