//! ChatController: the widget state machine.
//!
//! State lives in a `watch` channel so presentational layers can subscribe to snapshots. Every
//! mutation is a short synchronous closure; `send_message` is the only operation that awaits,
//! and while it does, open/close/clear stay callable.

use std::sync::{Arc, Mutex, MutexGuard};

use chat_core::{
    generate_session_id, validate_session_id, BotClient, ChatApiError, ChatEvent, ChatSession,
    ChatState, ErrorCode, Message, PreferencesUpdate, RateLimitConfig, Sender,
};
use chat_storage::ChatStorage;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::events::track;
use crate::rate_limiter::RateLimiter;

pub const RATE_LIMITED_MESSAGE: &str =
    "Demasiados mensajes. Por favor espera un momento antes de enviar otro mensaje.";
const TIMEOUT_MESSAGE: &str = "La conexión ha tardado demasiado. Por favor inténtalo de nuevo.";
const NETWORK_MESSAGE: &str = "No se pudo conectar con el servidor. Verifica tu conexión.";
const HTTP_MESSAGE: &str = "Error del servidor. Por favor inténtalo más tarde.";

/// Spanish text shown to the user for a failed send.
pub fn user_facing_error(err: &ChatApiError) -> String {
    match err.code() {
        Some(ErrorCode::Timeout) => TIMEOUT_MESSAGE.to_string(),
        Some(ErrorCode::NetworkError) => NETWORK_MESSAGE.to_string(),
        Some(ErrorCode::HttpError) => HTTP_MESSAGE.to_string(),
        _ => err.to_string(),
    }
}

struct Inner {
    state: watch::Sender<ChatState>,
    limiter: Mutex<RateLimiter>,
    storage: ChatStorage,
    bot: Arc<dyn BotClient>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ChatController {
    inner: Arc<Inner>,
}

impl ChatController {
    /// Loads (or mints) the session and transcript from `storage`. Never fails: unusable storage
    /// yields a fresh session id and an empty transcript.
    pub fn new(storage: ChatStorage, bot: Arc<dyn BotClient>, rate_limit: RateLimitConfig) -> Self {
        let initial = load_initial_state(&storage);
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                state,
                limiter: Mutex::new(RateLimiter::new(rate_limit)),
                storage,
                bot,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ChatState {
        self.inner.state.borrow().clone()
    }

    pub fn session_id(&self) -> String {
        self.inner.state.borrow().session_id.clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.inner.state.subscribe()
    }

    fn update(&self, mutate: impl FnOnce(&mut ChatState)) {
        self.inner.state.send_modify(mutate);
    }

    fn limiter(&self) -> MutexGuard<'_, RateLimiter> {
        self.inner
            .limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn track(&self, event: ChatEvent) {
        let state = self.inner.state.borrow();
        track(event, &state.session_id, state.messages.len());
    }

    /// Writes the transcript through to storage when it is non-empty.
    fn persist_messages(&self) {
        let messages = self.inner.state.borrow().messages.clone();
        if messages.is_empty() {
            return;
        }
        let saved = self.inner.storage.save_messages(&messages);
        self.inner.storage.update_last_activity();
        debug!(count = messages.len(), saved, "transcript persisted");
    }

    pub fn open_chat(&self) {
        self.update(|s| {
            s.is_open = true;
            s.has_unread_messages = false;
            s.error = None;
        });
        self.inner
            .storage
            .save_preferences(PreferencesUpdate::minimized(false));
        self.track(ChatEvent::ChatOpened);
    }

    pub fn close_chat(&self) {
        self.update(|s| s.is_open = false);
        self.inner
            .storage
            .save_preferences(PreferencesUpdate::minimized(false));
        self.track(ChatEvent::ChatClosed);
    }

    /// Like close, but remembered so the next start stays closed.
    pub fn minimize_chat(&self) {
        self.update(|s| s.is_open = false);
        self.inner
            .storage
            .save_preferences(PreferencesUpdate::minimized(true));
        self.track(ChatEvent::ChatMinimized);
    }

    /// Startup restore: reopens the widget unless the user minimized it last time.
    /// Returns whether it is open afterwards.
    pub fn restore_visibility(&self) -> bool {
        if self.inner.storage.get_preferences().minimized {
            self.update(|s| s.is_open = false);
            return false;
        }
        self.open_chat();
        true
    }

    pub fn mark_as_read(&self) {
        self.update(|s| s.has_unread_messages = false);
    }

    /// Empties the transcript, wipes the stored session and starts a new one.
    pub fn clear_messages(&self) {
        self.track(ChatEvent::SessionEnded);
        self.update(|s| {
            s.messages.clear();
            s.error = None;
        });
        self.inner.storage.clear_session();

        let session_id = start_session(&self.inner.storage);
        self.update(|s| s.session_id = session_id);
        self.track(ChatEvent::SessionStarted);
    }

    /// Sends `text` to the bot. Failures become state (an error bubble plus `error`); this never
    /// returns an error and never panics on bot failures.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.inner.state.borrow().is_loading {
            return;
        }

        let now = Utc::now().timestamp_millis();
        if !self.limiter().try_acquire_at(now) {
            warn!("Send rejected by rate limiter");
            self.update(|s| s.error = Some(RATE_LIMITED_MESSAGE.to_string()));
            return;
        }

        let user_message = Message::user(text);
        let started = self.inner.state.send_if_modified(|s| {
            if s.is_loading {
                return false;
            }
            s.error = None;
            s.is_loading = true;
            s.is_typing = true;
            s.messages.push(user_message);
            true
        });
        if !started {
            return;
        }
        self.persist_messages();
        self.track(ChatEvent::MessageSent);

        // Replies belong to the session that asked.
        let session_id = self.session_id();
        let result = self.inner.bot.send_message(text, &session_id).await;

        let (reply, error_text) = match result {
            Ok(reply) => (Message::bot(reply), None),
            Err(e) => {
                warn!(error = %e, code = ?e.code(), "Chat send failed");
                let shown = user_facing_error(&e);
                (Message::bot_error(shown.clone()), Some(shown))
            }
        };
        let is_error = error_text.is_some();

        let mut committed = false;
        self.update(|s| {
            s.is_loading = false;
            s.is_typing = false;
            if s.session_id != session_id {
                return;
            }
            if !s.is_open {
                s.has_unread_messages = true;
            }
            s.messages.push(reply);
            if error_text.is_some() {
                s.error = error_text;
            }
            committed = true;
        });

        if !committed {
            warn!(
                issued_for = %session_id,
                current = %self.session_id(),
                "Discarding reply for a session that was cleared"
            );
            return;
        }
        self.persist_messages();
        self.track(if is_error {
            ChatEvent::ErrorOccurred
        } else {
            ChatEvent::MessageReceived
        });
    }

    /// Drops error bubbles and resends the most recent user message.
    pub async fn retry_last_message(&self) {
        let last_user_text = self
            .inner
            .state
            .borrow()
            .messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.clone());
        let Some(text) = last_user_text else {
            return;
        };

        self.update(|s| {
            s.messages.retain(|m| !m.is_error);
            s.error = None;
        });
        self.persist_messages();
        self.send_message(&text).await;
    }
}

/// Mints a session id and records it with fresh metadata.
fn start_session(storage: &ChatStorage) -> String {
    let session_id = generate_session_id();
    storage.save_session_id(&session_id);
    storage.save_session(&ChatSession::new(session_id.clone()));
    info!(session_id = %session_id, "Started new chat session");
    session_id
}

fn load_initial_state(storage: &ChatStorage) -> ChatState {
    storage.cleanup_old_sessions();

    let stored_id = storage
        .get_session_id()
        .filter(|id| validate_session_id(id));
    let (session_id, messages) = match stored_id {
        Some(id) => (id, storage.get_messages()),
        None => (start_session(storage), Vec::new()),
    };
    let preferences = storage.get_preferences();

    if storage.get_session().map(|s| s.id) != Some(session_id.clone()) {
        let mut session = ChatSession::new(session_id.clone());
        session.messages = messages.clone();
        storage.save_session(&session);
    }

    let state = ChatState {
        is_open: false,
        session_id,
        messages,
        ..ChatState::default()
    };
    info!(
        session_id = %state.session_id,
        messages = state.messages.len(),
        minimized = preferences.minimized,
        "Chat state initialized"
    );
    track(
        ChatEvent::SessionStarted,
        &state.session_id,
        state.messages.len(),
    );
    state
}
