//! Session and message id generation.

use std::sync::OnceLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_RANDOM_LEN: usize = 13;
const MESSAGE_RANDOM_LEN: usize = 11;

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `chat_<13-digit millis>_<13 base36 chars>`.
pub fn generate_session_id() -> String {
    format!(
        "chat_{}_{}",
        Utc::now().timestamp_millis(),
        random_base36(SESSION_RANDOM_LEN)
    )
}

/// Checks the exact shape produced by [`generate_session_id`].
pub fn validate_session_id(session_id: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^chat_\d{13}_[a-z0-9]{13}$").expect("session id pattern"))
        .is_match(session_id)
}

/// `msg_<millis>_<base36>`; unique within a session in practice.
pub fn generate_message_id() -> String {
    format!(
        "msg_{}_{}",
        Utc::now().timestamp_millis(),
        random_base36(MESSAGE_RANDOM_LEN)
    )
}
