//! Analytics events as structured tracing output.

use chat_core::ChatEvent;
use tracing::info;

/// Emits `event` under the `chat_analytics` target.
pub fn track(event: ChatEvent, session_id: &str, message_count: usize) {
    info!(
        target: "chat_analytics",
        event = event.as_str(),
        session_id,
        message_count,
        "chat event"
    );
}
