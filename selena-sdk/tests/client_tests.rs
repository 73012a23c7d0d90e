//! End-to-end tests for the Selena client.
//!
//! These tests drive the public client against a wiremock server and verify the
//! request→transport→classification flow.

use parking_lot::Mutex;
use selena_sdk::{ChatRequest, ErrorKind, LogLevel, LogSink, Selena, SelenaError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build a client pointed at the mock server with captured logs.
fn build_client(server: &MockServer, level: LogLevel) -> (Selena, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);

    let client = Selena::builder()
        .api_key("sk-integration")
        .base_url(server.uri())
        .log_level(level)
        .log_sink(LogSink::callback(move |_, line| {
            captured.lock().push(line.to_string())
        }))
        .build()
        .expect("Failed to build client");

    (client, lines)
}

// ============================================================================
// Request Flow Tests
// ============================================================================

#[tokio::test]
async fn test_completion_hits_chat_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(query_param("skd", "true"))
        .and(header("authorization", "Bearer sk-integration"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "hi", "id": "abc"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = build_client(&server, LogLevel::None);
    let response = client
        .chat()
        .completions(ChatRequest::new("Hello"))
        .await
        .unwrap();

    assert_eq!(response.response, "hi");
    assert_eq!(response.extra["id"], "abc");
}

#[tokio::test]
async fn test_untyped_params_with_non_string_model_never_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = build_client(&server, LogLevel::None);
    let result = match ChatRequest::from_value(&json!({"message": "Hi", "model": 7})) {
        Ok(request) => client.chat().completions(request).await,
        Err(e) => Err(e),
    };

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("model"));
}

#[tokio::test]
async fn test_streaming_through_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"text\":\"Hel\"}\n\ndata: {\"content\":\"lo \"}\ndata: {\"token\":\"there\"}\ndata: [DONE]\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let (client, _) = build_client(&server, LogLevel::None);

    let tokens = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&tokens);
    let request = ChatRequest::new("Hi")
        .stream(true)
        .on_token(move |t| captured.lock().push(t.to_string()));

    let response = client.chat().completions(request).await.unwrap();

    assert_eq!(response.response, "Hello there");
    assert_eq!(
        *tokens.lock(),
        vec!["Hel".to_string(), "lo ".to_string(), "there".to_string()]
    );
}

#[tokio::test]
async fn test_connection_failure_is_network_kind() {
    // Nothing listens on port 1
    let client = Selena::builder()
        .api_key("sk-integration")
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client
        .chat()
        .completions(ChatRequest::new("Hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, SelenaError::Network(_)));
    assert_eq!(err.kind(), ErrorKind::Network);
}

// ============================================================================
// Logging Tests
// ============================================================================

#[tokio::test]
async fn test_debug_logging_traces_exchange_without_message_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .mount(&server)
        .await;

    let (client, lines) = build_client(&server, LogLevel::Info);
    client
        .chat()
        .completions(ChatRequest::new("private prompt"))
        .await
        .unwrap();

    {
        let lines = lines.lock();
        assert!(lines.iter().any(|l| l.contains("Creating chat completion")));
        assert!(lines.iter().any(|l| l.contains("\"messageLength\":14")));
        assert!(lines
            .iter()
            .any(|l| l.contains("Chat completion created successfully")));
        assert!(lines.iter().all(|l| !l.contains("[Selena DEBUG]")));
        assert!(lines.iter().all(|l| !l.contains("private prompt")));
    }

    client.set_log_level(LogLevel::Debug);
    lines.lock().clear();

    client
        .chat()
        .completions(ChatRequest::new("Hi"))
        .await
        .unwrap();

    let lines = lines.lock();
    assert!(lines
        .iter()
        .any(|l| l.contains("[Selena DEBUG] → POST") && l.contains("/api/chat?skd=true")));
    assert!(lines.iter().any(|l| l.contains("[Selena DEBUG] ← 200 (")));
    assert!(lines
        .iter()
        .any(|l| l.contains("[Selena DEBUG] Response: {\"response\":\"ok\"}")));
}

#[tokio::test]
async fn test_failures_logged_at_error_level() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let (client, lines) = build_client(&server, LogLevel::Error);
    let err = client
        .chat()
        .completions(ChatRequest::new("Hi"))
        .await
        .unwrap_err();

    assert!(err.is_auth());

    let lines = lines.lock();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("[Selena ERROR] Request failed: HTTP 401: Unauthorized - denied"));
    assert!(lines[1].contains("[Selena ERROR] Chat completion failed"));
}

#[tokio::test]
async fn test_superseded_handle_keeps_old_logger() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .mount(&server)
        .await;

    let (client, lines) = build_client(&server, LogLevel::None);
    let old_chat = client.chat();

    client.set_log_level(LogLevel::Info);
    lines.lock().clear();

    old_chat.completions(ChatRequest::new("Hi")).await.unwrap();
    assert!(lines.lock().is_empty());

    client
        .chat()
        .completions(ChatRequest::new("Hi"))
        .await
        .unwrap();
    assert!(!lines.lock().is_empty());
}
