//! Integration tests for [`chat_client::ChatApiClient`] over [`chat_client::WebhookTransport`].
//!
//! The webhook is a mockito server; timeouts use a TCP listener that accepts connections and
//! never answers, and network errors use a port with nothing listening.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_client::{
    BotTransport, ChatApiClient, ChatApiError, ErrorCode, RetryPolicy, WebhookTransport,
};
use mockito::Matcher;
use serde_json::json;

const SESSION_ID: &str = "chat_1700000000000_abcdefghijklm";

fn fast_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    }
}

fn client_for(endpoint: String, timeout: Duration, retry: RetryPolicy) -> ChatApiClient {
    ChatApiClient::new(Arc::new(WebhookTransport::new(endpoint, timeout))).with_retry_policy(retry)
}

/// **Test: Successful exchange.**
///
/// **Setup:** Mock webhook expecting the JSON body and headers, replying with `output`.
/// **Action:** `send_message_to_bot("Hola", ...)`.
/// **Expected:** Returns the reply; the mock was hit exactly once.
#[tokio::test]
async fn test_send_message_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webhook/chat-bienvenida")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_body(Matcher::Json(json!({
            "chatInput": "Hola",
            "sessionId": SESSION_ID,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"output":"¡Hola! ¿En qué puedo ayudarte?"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(
        format!("{}/webhook/chat-bienvenida", server.url()),
        Duration::from_secs(5),
        fast_retries(3),
    );
    let reply = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap();

    assert_eq!(reply, "¡Hola! ¿En qué puedo ayudarte?");
    mock.assert_async().await;
}

/// **Test: `response` is used when `output` is missing; the reply is sanitized.**
#[tokio::test]
async fn test_send_message_response_fallback_is_sanitized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":"  Claro <script>x()</script>te ayudo  ","status":"ok"}"#)
        .create_async()
        .await;

    let client = client_for(format!("{}/hook", server.url()), Duration::from_secs(5), fast_retries(0));
    let reply = client.send_message_to_bot("ayuda", SESSION_ID).await.unwrap();

    assert_eq!(reply, "Claro te ayudo");
}

/// **Test: HTTP 500 is not retried.**
///
/// **Setup:** Mock returning 500, expected exactly once; retry policy allows 3 retries.
/// **Expected:** `HTTP_ERROR` with status 500; one request only.
#[tokio::test]
async fn test_http_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(format!("{}/hook", server.url()), Duration::from_secs(5), fast_retries(3));
    let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::HttpError));
    assert_eq!(err.status(), Some(500));
    mock.assert_async().await;
}

/// **Test: Malformed payloads map to INVALID_RESPONSE / EMPTY_RESPONSE without retry.**
#[tokio::test]
async fn test_malformed_payloads() {
    let mut server = mockito::Server::new_async().await;
    let array_mock = server
        .mock("POST", "/array")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"output":"hola"}]"#)
        .expect(1)
        .create_async()
        .await;
    let empty_mock = server
        .mock("POST", "/empty")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"done"}"#)
        .expect(1)
        .create_async()
        .await;
    let text_mock = server
        .mock("POST", "/text")
        .with_status(200)
        .with_body("not json")
        .expect(1)
        .create_async()
        .await;

    for (path, expected) in [
        ("/array", ChatApiError::InvalidResponse),
        ("/empty", ChatApiError::EmptyResponse),
        ("/text", ChatApiError::InvalidResponse),
    ] {
        let client = client_for(format!("{}{}", server.url(), path), Duration::from_secs(5), fast_retries(3));
        let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();
        assert_eq!(err, expected, "path {}", path);
    }

    array_mock.assert_async().await;
    empty_mock.assert_async().await;
    text_mock.assert_async().await;
}

/// **Test: Oversized input is rejected before any request.**
#[tokio::test]
async fn test_too_long_input_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").expect(0).create_async().await;

    let client = client_for(format!("{}/hook", server.url()), Duration::from_secs(5), fast_retries(3));
    let err = client
        .send_message_to_bot(&"a".repeat(1001), SESSION_ID)
        .await
        .unwrap_err();

    assert!(matches!(err, ChatApiError::Validation(_)));
    assert_eq!(err.code(), None);
    mock.assert_async().await;
}

/// **Test: A server that never answers yields TIMEOUT after 1 + max_retries attempts.**
///
/// **Setup:** TCP listener counting accepted connections, never writing a response.
/// **Expected:** TIMEOUT; exactly three connections for max_retries = 2.
#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    let client = client_for(
        format!("http://{}/hook", addr),
        Duration::from_millis(150),
        fast_retries(2),
    );
    let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();

    assert_eq!(err, ChatApiError::Timeout);
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}

/// **Test: Nothing listening yields NETWORK_ERROR.**
#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}/hook", addr), Duration::from_secs(2), fast_retries(1));
    let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::NetworkError));
}

/// Transport that always fails with the given error and counts calls.
struct FailingTransport {
    error: ChatApiError,
    calls: AtomicUsize,
}

#[async_trait]
impl BotTransport for FailingTransport {
    async fn post_chat(&self, _chat_input: &str, _session_id: &str) -> Result<String, ChatApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// **Test: Network errors are attempted exactly 1 + max_retries times.**
#[tokio::test]
async fn test_network_error_attempts_one_plus_max_retries() {
    let transport = Arc::new(FailingTransport {
        error: ChatApiError::Network("connection reset".into()),
        calls: AtomicUsize::new(0),
    });
    let client = ChatApiClient::new(transport.clone()).with_retry_policy(fast_retries(3));

    let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::NetworkError));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
}

/// **Test: A caller-supplied retry count consumes part of the retry budget.**
#[tokio::test]
async fn test_send_with_retry_count_resumes_budget() {
    let transport = Arc::new(FailingTransport {
        error: ChatApiError::Timeout,
        calls: AtomicUsize::new(0),
    });
    let client = ChatApiClient::new(transport.clone()).with_retry_policy(fast_retries(3));

    let _ = client.send_with_retry_count("Hola", SESSION_ID, 2).await;

    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

/// **Test: Unknown errors propagate on the first failure.**
#[tokio::test]
async fn test_unknown_error_not_retried() {
    let transport = Arc::new(FailingTransport {
        error: ChatApiError::Unknown("boom".into()),
        calls: AtomicUsize::new(0),
    });
    let client = ChatApiClient::new(transport.clone()).with_retry_policy(fast_retries(3));

    let err = client.send_message_to_bot("Hola", SESSION_ID).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::UnknownError));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}
