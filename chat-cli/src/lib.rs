//! # chat-cli
//!
//! Terminal front end: argument parsing, config loading, service content lookup and transcript
//! rendering. Chat logic lives in chat-runtime.

pub mod cli;
pub mod content;
pub mod render;

#[cfg(test)]
mod content_test;

pub use chat_core::ChatConfig;
pub use cli::{load_config, Cli, Commands};
pub use content::{ContentError, ServiceContentStore};
pub use render::{render_message, ReplCommand, TranscriptCursor};
