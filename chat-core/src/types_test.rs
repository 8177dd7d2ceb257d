//! Unit tests for core types, id helpers and the error taxonomy.

use crate::error::{ChatApiError, ErrorCode, ValidationError};
use crate::ids::{generate_message_id, generate_session_id, validate_session_id};
use crate::types::{Message, Preferences, PreferencesUpdate, Sender, Theme};

#[test]
fn test_generated_session_id_validates() {
    for _ in 0..20 {
        let id = generate_session_id();
        assert!(validate_session_id(&id), "generated id rejected: {}", id);
    }
}

#[test]
fn test_validate_session_id_rejects_other_shapes() {
    assert!(!validate_session_id(""));
    assert!(!validate_session_id("chat_123_abc"));
    assert!(!validate_session_id("chat_1700000000000_ABCDEFGHIJKLM"));
    assert!(!validate_session_id("session_1700000000000_abcdefghijklm"));
    assert!(!validate_session_id("chat_1700000000000_abcdefghijklm "));
    assert!(validate_session_id("chat_1700000000000_abcdefghijk12"));
}

#[test]
fn test_message_ids_are_unique() {
    let a = generate_message_id();
    let b = generate_message_id();
    assert_ne!(a, b);
    assert!(a.starts_with("msg_"));
}

#[test]
fn test_message_serializes_with_stored_field_names() {
    let message = Message::bot_error("falló");
    let json = serde_json::to_value(&message).unwrap();

    assert_eq!(json["sender"], "bot");
    assert_eq!(json["isError"], true);
    assert!(json["timestamp"].is_string());
    assert_eq!(message.sender, Sender::Bot);
}

#[test]
fn test_preferences_update_merges_shallowly() {
    let base = Preferences {
        sound_enabled: true,
        theme: Theme::Dark,
        minimized: false,
    };

    let merged = PreferencesUpdate::minimized(true).apply_to(base);

    assert!(merged.sound_enabled);
    assert_eq!(merged.theme, Theme::Dark);
    assert!(merged.minimized);
    assert_eq!(Preferences::default().theme, Theme::Auto);
}

#[test]
fn test_error_codes_and_retryability() {
    assert_eq!(ChatApiError::Timeout.code(), Some(ErrorCode::Timeout));
    assert!(ChatApiError::Timeout.is_retryable());
    assert!(ChatApiError::Network("refused".into()).is_retryable());

    let http = ChatApiError::Http {
        status: 500,
        status_text: "Internal Server Error".into(),
    };
    assert_eq!(http.code().map(|c| c.as_str()), Some("HTTP_ERROR"));
    assert_eq!(http.status(), Some(500));
    assert!(!http.is_retryable());

    let unknown = ChatApiError::Unknown("error decoding response body: hyper::Error(Io)".into());
    assert_eq!(unknown.to_string(), "Unexpected error occurred");
    assert_eq!(unknown.code(), Some(ErrorCode::UnknownError));

    let validation = ChatApiError::from(ValidationError::TooLong { max: 1000 });
    assert_eq!(validation.code(), None);
    assert!(!validation.is_retryable());
    assert_eq!(
        validation.to_string(),
        "Invalid input: message too long (max 1000 characters)"
    );
}
