//! Core types: message, chat state, session, preferences and analytics events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::generate_message_id;

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single transcript entry. Field names on the wire follow the stored JSON shape
/// (`id`, `text`, `sender`, `timestamp`, `isError`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    /// Creates a message with a fresh id and the current time.
    pub fn new(text: impl Into<String>, sender: Sender, is_error: bool) -> Self {
        Self {
            id: generate_message_id(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            is_error,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, false)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, false)
    }

    /// Bot-side bubble describing a failed send; rendered with an inline retry control.
    pub fn bot_error(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, true)
    }
}

/// In-memory widget state. Owned exclusively by the controller; the presentational layer only
/// reads snapshots of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub is_open: bool,
    /// A send is in flight.
    pub is_loading: bool,
    /// The bot is "composing"; only true while a send is outstanding.
    pub is_typing: bool,
    pub messages: Vec<Message>,
    pub session_id: String,
    /// A bot message arrived while the widget was closed.
    pub has_unread_messages: bool,
    /// Last user-facing error; cleared at the start of every send.
    pub error: Option<String>,
}

/// A persisted conversation: metadata plus its transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// Persisted UI preferences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sound_enabled: bool,
    pub theme: Theme,
    /// Distinguishes "user minimized" from "user closed" for restore logic.
    pub minimized: bool,
}

/// Partial preferences; `None` fields keep their current value when merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub sound_enabled: Option<bool>,
    pub theme: Option<Theme>,
    pub minimized: Option<bool>,
}

impl PreferencesUpdate {
    pub fn minimized(minimized: bool) -> Self {
        Self {
            minimized: Some(minimized),
            ..Self::default()
        }
    }

    /// Shallow merge over `base`.
    pub fn apply_to(&self, base: Preferences) -> Preferences {
        Preferences {
            sound_enabled: self.sound_enabled.unwrap_or(base.sound_enabled),
            theme: self.theme.unwrap_or(base.theme),
            minimized: self.minimized.unwrap_or(base.minimized),
        }
    }
}

/// Widget analytics events, emitted as structured tracing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEvent {
    ChatOpened,
    ChatClosed,
    ChatMinimized,
    MessageSent,
    MessageReceived,
    ErrorOccurred,
    SessionStarted,
    SessionEnded,
}

impl ChatEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatEvent::ChatOpened => "chat_opened",
            ChatEvent::ChatClosed => "chat_closed",
            ChatEvent::ChatMinimized => "chat_minimized",
            ChatEvent::MessageSent => "message_sent",
            ChatEvent::MessageReceived => "message_received",
            ChatEvent::ErrorOccurred => "error_occurred",
            ChatEvent::SessionStarted => "session_started",
            ChatEvent::SessionEnded => "session_ended",
        }
    }
}

impl std::fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
