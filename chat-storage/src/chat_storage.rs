//! Guarded persistence of the chat session, transcript and preferences.
//!
//! Every operation checks backend availability first (by default a sentinel write and delete;
//! [`crate::FileStorage`] only inspects file metadata). An unavailable backend turns each call
//! into a silent no-op: writes return `false`, reads return `None` or an empty list. Backend
//! errors are logged with `warn!` and never propagated.

use std::sync::Arc;

use chat_core::{ChatSession, Message, Preferences, PreferencesUpdate, Sender, Theme};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::KeyValueStorage;

/// Storage keys, namespaced per site.
pub mod keys {
    pub const SESSION_ID: &str = "tusolucion_chat_session_id";
    pub const MESSAGES: &str = "tusolucion_chat_messages";
    pub const SESSION_DATA: &str = "tusolucion_chat_session";
    pub const LAST_ACTIVITY: &str = "tusolucion_chat_last_activity";
    pub const PREFERENCES: &str = "tusolucion_chat_preferences";
}

pub const DEFAULT_MAX_MESSAGES: usize = 50;
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 24 * 60 * 60;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredMessage<'a> {
    id: &'a str,
    text: &'a str,
    sender: Sender,
    timestamp: String,
    is_error: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    id: String,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

/// Diagnostic snapshot of what storage currently holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub has_storage: bool,
    pub session_exists: bool,
    pub message_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    pub preferences: Preferences,
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field)?.as_str().filter(|s| !s.is_empty())
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Returns `None` for records missing `id`/`text`, with an unknown sender, or a bad timestamp.
fn parse_stored_message(value: &Value) -> Option<Message> {
    let id = non_empty_str(value, "id")?;
    let text = non_empty_str(value, "text")?;
    let sender = match value.get("sender")?.as_str()? {
        "user" => Sender::User,
        "bot" => Sender::Bot,
        _ => return None,
    };
    let timestamp = parse_timestamp(value.get("timestamp")?)?;
    let is_error = value
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(Message {
        id: id.to_string(),
        text: text.to_string(),
        sender,
        timestamp,
        is_error,
    })
}

/// Merges whichever stored preference fields parse over the defaults.
fn merge_preferences(stored: &Value) -> Preferences {
    let mut prefs = Preferences::default();
    if let Some(v) = stored.get("soundEnabled").and_then(Value::as_bool) {
        prefs.sound_enabled = v;
    }
    if let Some(theme) = stored
        .get("theme")
        .and_then(|v| serde_json::from_value::<Theme>(v.clone()).ok())
    {
        prefs.theme = theme;
    }
    if let Some(v) = stored.get("minimized").and_then(Value::as_bool) {
        prefs.minimized = v;
    }
    prefs
}

/// Session, transcript and preferences persistence over a [`KeyValueStorage`] backend.
#[derive(Clone)]
pub struct ChatStorage {
    backend: Arc<dyn KeyValueStorage>,
    max_messages: usize,
    session_timeout: chrono::Duration,
}

impl ChatStorage {
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            backend,
            max_messages: DEFAULT_MAX_MESSAGES,
            session_timeout: chrono::Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }

    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_session_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.session_timeout = chrono::Duration::from_std(timeout)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS));
        self
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn is_available(&self) -> bool {
        match self.backend.check_available() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Storage unavailable");
                false
            }
        }
    }

    fn safe_get(&self, key: &str) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Error reading from storage");
                None
            }
        }
    }

    fn safe_set(&self, key: &str, value: &str) -> bool {
        if !self.is_available() {
            return false;
        }
        match self.backend.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error writing to storage");
                false
            }
        }
    }

    fn safe_remove(&self, key: &str) -> bool {
        if !self.is_available() {
            return false;
        }
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error removing from storage");
                false
            }
        }
    }

    pub fn save_session_id(&self, session_id: &str) -> bool {
        self.safe_set(keys::SESSION_ID, session_id)
    }

    pub fn get_session_id(&self) -> Option<String> {
        self.safe_get(keys::SESSION_ID)
    }

    /// Keeps only the newest `max_messages` entries.
    pub fn save_messages(&self, messages: &[Message]) -> bool {
        let start = messages.len().saturating_sub(self.max_messages);
        let stored: Vec<StoredMessage<'_>> = messages[start..]
            .iter()
            .map(|m| StoredMessage {
                id: &m.id,
                text: &m.text,
                sender: m.sender,
                timestamp: iso(&m.timestamp),
                is_error: m.is_error,
            })
            .collect();

        match serde_json::to_string(&stored) {
            Ok(json) => self.safe_set(keys::MESSAGES, &json),
            Err(e) => {
                warn!(error = %e, "Error saving messages");
                false
            }
        }
    }

    /// Malformed records are dropped rather than failing the whole load.
    pub fn get_messages(&self) -> Vec<Message> {
        let Some(stored) = self.safe_get(keys::MESSAGES) else {
            return Vec::new();
        };
        let records: Value = match serde_json::from_str(&stored) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Error loading messages");
                return Vec::new();
            }
        };
        let Some(records) = records.as_array() else {
            return Vec::new();
        };

        let messages: Vec<Message> = records.iter().filter_map(parse_stored_message).collect();
        if messages.len() < records.len() {
            warn!(
                dropped = records.len() - messages.len(),
                "Dropped malformed stored messages"
            );
        }
        messages
    }

    /// Writes metadata, transcript and last activity; true only if all three succeed.
    pub fn save_session(&self, session: &ChatSession) -> bool {
        let record = StoredSession {
            id: session.id.clone(),
            created_at: session.created_at,
            last_activity: session.last_activity,
        };
        let metadata_saved = match serde_json::to_string(&record) {
            Ok(json) => self.safe_set(keys::SESSION_DATA, &json),
            Err(e) => {
                warn!(error = %e, "Error saving session");
                false
            }
        };
        let messages_saved = self.save_messages(&session.messages);
        let activity_saved = self.update_last_activity();

        metadata_saved && messages_saved && activity_saved
    }

    /// Stored session without the expiry check. Last activity is the later of the metadata
    /// value and the standalone last-activity key, which is refreshed on every transcript write.
    fn read_session(&self) -> Option<ChatSession> {
        let raw = self.safe_get(keys::SESSION_DATA)?;
        let record: StoredSession = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Error loading session");
                return None;
            }
        };
        let last_activity = match self.get_last_activity() {
            Some(touched) if touched > record.last_activity => touched,
            _ => record.last_activity,
        };

        Some(ChatSession {
            id: record.id,
            messages: self.get_messages(),
            created_at: record.created_at,
            last_activity,
        })
    }

    /// `None` when absent; an expired session is cleared from storage and also yields `None`.
    pub fn get_session(&self) -> Option<ChatSession> {
        let session = self.read_session()?;
        if self.is_session_expired(session.last_activity) {
            info!(session_id = %session.id, "Stored chat session expired");
            self.clear_session();
            return None;
        }
        Some(session)
    }

    /// Removes id, transcript, metadata and last activity. True if at least one removal succeeded.
    pub fn clear_session(&self) -> bool {
        let results = [
            self.safe_remove(keys::SESSION_ID),
            self.safe_remove(keys::MESSAGES),
            self.safe_remove(keys::SESSION_DATA),
            self.safe_remove(keys::LAST_ACTIVITY),
        ];
        results.iter().any(|ok| *ok)
    }

    pub fn update_last_activity(&self) -> bool {
        self.safe_set(
            keys::LAST_ACTIVITY,
            &Utc::now().timestamp_millis().to_string(),
        )
    }

    pub fn get_last_activity(&self) -> Option<DateTime<Utc>> {
        let raw = self.safe_get(keys::LAST_ACTIVITY)?;
        let millis = raw.trim().parse::<i64>().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    pub fn is_session_expired(&self, last_activity: DateTime<Utc>) -> bool {
        Utc::now() - last_activity > self.session_timeout
    }

    /// Shallow-merges `update` over the current preferences.
    pub fn save_preferences(&self, update: PreferencesUpdate) -> bool {
        let merged = update.apply_to(self.get_preferences());
        match serde_json::to_string(&merged) {
            Ok(json) => self.safe_set(keys::PREFERENCES, &json),
            Err(e) => {
                warn!(error = %e, "Error saving preferences");
                false
            }
        }
    }

    pub fn get_preferences(&self) -> Preferences {
        let Some(raw) = self.safe_get(keys::PREFERENCES) else {
            return Preferences::default();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(stored) => merge_preferences(&stored),
            Err(e) => {
                warn!(error = %e, "Error loading preferences");
                Preferences::default()
            }
        }
    }

    /// Expiry sweep: clears storage when the stored session has been idle too long.
    pub fn cleanup_old_sessions(&self) -> bool {
        match self.read_session() {
            Some(session) if self.is_session_expired(session.last_activity) => {
                info!(session_id = %session.id, "Sweeping expired chat session");
                self.clear_session()
            }
            _ => true,
        }
    }

    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            has_storage: self.is_available(),
            session_exists: self.get_session().is_some(),
            message_count: self.get_messages().len(),
            last_activity: self.get_last_activity(),
            preferences: self.get_preferences(),
        }
    }
}
