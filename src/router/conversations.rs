use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::data::{Conversation, Message, Role};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
}

#[axum::debug_handler]
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    Ok(Json(state.storage.get_conversations().await?))
}

/// Body is optional; the UI creates conversations without one.
#[axum::debug_handler]
pub async fn create_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Conversation>, ApiError> {
    let title = serde_json::from_slice::<CreateConversationRequest>(&body)
        .ok()
        .and_then(|request| request.title)
        .unwrap_or_else(|| "New Chat".to_string());
    let conversation = state.storage.create_conversation(&title).await?;
    Ok(Json(conversation))
}

#[axum::debug_handler]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.storage.delete_conversation(id).await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.storage.get_messages(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub role: Role,
    pub content: String,
}

#[axum::debug_handler]
pub async fn add_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = state
        .storage
        .add_message(id, request.role, &request.content)
        .await?;
    Ok(Json(message))
}

#[axum::debug_handler]
pub async fn clear_messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.storage.clear_messages(id).await?;
    Ok(Json(json!({ "success": true })))
}
