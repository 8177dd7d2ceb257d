//! Input and response sanitization, and reply extraction from the webhook payload.

use std::sync::OnceLock;

use chat_core::{ChatApiError, ValidationError};
use regex::Regex;
use serde_json::Value;

pub const MAX_INPUT_CHARS: usize = 1000;

/// Shown in place of a reply that is not usable text.
pub const INVALID_RESPONSE_FALLBACK: &str = "Error: Invalid response from server";

struct Patterns {
    script: Regex,
    tag: Regex,
    js_uri: Regex,
    event_handler: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        script: Regex::new(r"(?i)<script[^>]*>.*?</script>").expect("script pattern"),
        tag: Regex::new(r"<[^>]*>").expect("tag pattern"),
        js_uri: Regex::new(r"(?i)javascript:").expect("javascript uri pattern"),
        // ASCII attribute names only; accented words followed by `=` are ordinary text.
        event_handler: Regex::new(r"(?i)on[a-z0-9_]+\s*=").expect("event handler pattern"),
    })
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Trims, strips script blocks and tags, then entity-escapes `< > & " '`.
///
/// Rejects empty input, input that is empty once stripped, and results longer than
/// [`MAX_INPUT_CHARS`] characters (measured after escaping).
pub fn sanitize_input(input: &str) -> Result<String, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }

    let p = patterns();
    let without_scripts = p.script.replace_all(input.trim(), "");
    let without_tags = p.tag.replace_all(&without_scripts, "");
    let sanitized = escape_html(&without_tags);

    if sanitized.is_empty() {
        return Err(ValidationError::EmptyAfterSanitization);
    }
    if sanitized.chars().count() > MAX_INPUT_CHARS {
        return Err(ValidationError::TooLong {
            max: MAX_INPUT_CHARS,
        });
    }
    Ok(sanitized)
}

/// Strips script blocks, `javascript:` URIs and inline `on*=` handlers from a bot reply.
pub fn sanitize_response(response: &str) -> String {
    if response.is_empty() {
        return INVALID_RESPONSE_FALLBACK.to_string();
    }
    let p = patterns();
    let cleaned = p.script.replace_all(response, "");
    let cleaned = p.js_uri.replace_all(&cleaned, "");
    let cleaned = p.event_handler.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}

pub fn is_valid_message(message: &str) -> bool {
    sanitize_input(message).is_ok()
}

/// The body must be a JSON object; the reply is `output`, falling back to `response`.
pub fn parse_bot_reply(body: &Value) -> Result<String, ChatApiError> {
    let Some(object) = body.as_object() else {
        return Err(ChatApiError::InvalidResponse);
    };
    ["output", "response"]
        .iter()
        .find_map(|field| {
            object
                .get(*field)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
        })
        .map(str::to_string)
        .ok_or(ChatApiError::EmptyResponse)
}
