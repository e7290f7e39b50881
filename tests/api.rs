use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vllm_chat::ai::InferenceClient;
use vllm_chat::data::MemoryStorage;
use vllm_chat::router::api_router;
use vllm_chat::AppState;

/// Router over the in-memory backend, with the inference client pointed at
/// the discard port so every upstream call is refused immediately.
fn test_app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStorage::new()),
        InferenceClient::with_base_url("http://127.0.0.1:9"),
    );
    api_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        // Axum's built-in rejections (e.g. non-numeric path params) answer
        // with plain text; surface those as Null rather than panicking.
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn conversation_and_message_flow() {
    let app = test_app();

    let (status, conversation) =
        send(&app, Method::POST, "/api/conversations", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation["id"], 1);
    assert_eq!(conversation["title"], "New Chat");
    assert!(conversation["createdAt"].is_string());

    let (status, message) = send(
        &app,
        Method::POST,
        "/api/conversations/1/messages",
        Some(json!({ "role": "user", "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["id"], 1);
    assert_eq!(message["conversationId"], 1);
    assert_eq!(message["role"], "user");

    let (status, messages) = send(&app, Method::GET, "/api/conversations/1/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hi");
}

#[tokio::test]
async fn create_conversation_accepts_a_title() {
    let app = test_app();
    let (status, conversation) = send(
        &app,
        Method::POST,
        "/api/conversations",
        Some(json!({ "title": "Planning" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation["title"], "Planning");

    let (_, conversations) = send(&app, Method::GET, "/api/conversations", None).await;
    assert_eq!(conversations.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn clear_messages_empties_one_conversation() {
    let app = test_app();
    send(&app, Method::POST, "/api/conversations", None).await;
    for content in ["one", "two"] {
        send(
            &app,
            Method::POST,
            "/api/conversations/1/messages",
            Some(json!({ "role": "user", "content": content })),
        )
        .await;
    }

    let (status, body) = send(&app, Method::DELETE, "/api/conversations/1/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, messages) = send(&app, Method::GET, "/api/conversations/1/messages", None).await;
    assert!(messages.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_conversation_removes_it_and_its_messages() {
    let app = test_app();
    send(&app, Method::POST, "/api/conversations", None).await;
    send(
        &app,
        Method::POST,
        "/api/conversations/1/messages",
        Some(json!({ "role": "user", "content": "bye" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/api/conversations/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, conversations) = send(&app, Method::GET, "/api/conversations", None).await;
    assert!(conversations.as_array().unwrap().is_empty());
    let (_, messages) = send(&app, Method::GET, "/api/conversations/1/messages", None).await;
    assert!(messages.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_conversation_id_is_a_client_error() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/api/conversations/abc/messages", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_rejects_unknown_models() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/models/start",
        Some(json!({ "model": "not-a-real-model" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid model specified");
}

#[tokio::test]
async fn start_returns_the_launch_command() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/models/start",
        Some(json!({ "model": "bigscience/bloom-1b1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "bigscience/bloom-1b1");
    assert!(body["command"]
        .as_str()
        .unwrap()
        .contains("vllm.entrypoints.openai.api_server"));
    assert_eq!(body["instructions"].as_array().unwrap().len(), 4);

    let (status, status_body) = send(&app, Method::GET, "/api/models/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_body["running"], false);
    assert_eq!(status_body["model"], "bigscience/bloom-1b1");
    assert!(status_body["pid"].is_null());
}

#[tokio::test]
async fn stop_without_a_running_model_is_a_client_error() {
    let app = test_app();
    let (status, body) = send(&app, Method::POST, "/api/models/stop", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No model is currently running");
}

#[tokio::test]
async fn settings_update_merges_partial_fields() {
    let app = test_app();

    let (status, settings) = send(&app, Method::GET, "/api/chat/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["temperature"], "0.7");
    assert_eq!(settings["maxTokens"], 512);

    let (status, settings) = send(
        &app,
        Method::PUT,
        "/api/chat/settings",
        Some(json!({ "temperature": "1.2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["temperature"], "1.2");
    assert_eq!(settings["maxTokens"], 512);

    let (_, settings) = send(
        &app,
        Method::PUT,
        "/api/chat/settings",
        Some(json!({ "maxTokens": 1024 })),
    )
    .await;
    assert_eq!(settings["temperature"], "1.2");
    assert_eq!(settings["maxTokens"], 1024);
}

#[tokio::test]
async fn chat_status_reports_disconnected_upstream() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/chat/status", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["connected"], false);
    assert!(body["error"].as_str().unwrap().contains("VLLM"));
}

#[tokio::test]
async fn completion_validation_fires_before_any_upstream_call() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat/completions",
        Some(json!({
            "messages": [{ "role": "user", "content": "hi" }],
            "temperature": 2.5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("temperature"));
}

#[tokio::test]
async fn completion_with_unreachable_upstream_is_a_server_error() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat/completions",
        Some(json!({
            "messages": [{ "role": "user", "content": "hi" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to get chat completion");
    assert!(body["details"].is_string());
}
